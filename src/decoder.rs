//! Pure per-frame decoder.
//!
//! [`FrameDecoder::decode`] turns one raw frame into decoded field values
//! plus an optional checksum verdict. It holds no mutable state: the same
//! frame bytes and configuration always produce bit-identical results,
//! which is what makes fan-out across frames safe (see the stream layer).
//!
//! Bit addressing is big-endian MSB-first: bit 0 of a section is the most
//! significant bit of its first byte. Catalog validation guarantees every
//! configured field fits its section; the decoder re-checks bounds
//! anyway so a hand-built [`FieldSpec`] can never cause an out-of-bounds
//! read.

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::{FieldEncoding, FieldSpec};
use crate::layout::FrameLayout;
use crate::mission::MissionProfile;
use crate::types::FieldValue;
use crate::{Result, TelemetryError};

/// Read the raw bits of a field out of a frame, MSB-first.
pub(crate) fn read_raw(frame: &[u8], layout: &FrameLayout, spec: &FieldSpec) -> Result<u64> {
    let range = layout.range_of(&spec.section).ok_or_else(|| {
        TelemetryError::field_extraction(&spec.name, format!("unknown section '{}'", spec.section))
    })?;
    let section = frame.get(range).ok_or(TelemetryError::FrameLength {
        expected: layout.total_len(),
        actual: frame.len(),
    })?;

    let end = spec
        .bit_offset
        .checked_add(spec.bit_width)
        .filter(|&end| end <= section.len() * 8)
        .ok_or_else(|| {
            TelemetryError::field_extraction(
                &spec.name,
                format!(
                    "bit range {}..{} exceeds section '{}'",
                    spec.bit_offset,
                    spec.bit_offset.saturating_add(spec.bit_width),
                    spec.section
                ),
            )
        })?;

    let mut raw = 0u64;
    for bit in spec.bit_offset..end {
        let byte = section[bit / 8];
        raw = (raw << 1) | u64::from((byte >> (7 - bit % 8)) & 1);
    }
    Ok(raw)
}

/// Interpret raw bits per the field's encoding and apply the calibration.
fn decode_value(spec: &FieldSpec, raw: u64) -> FieldValue {
    match spec.encoding {
        FieldEncoding::UnsignedInt => {
            if spec.identity_calibration() {
                FieldValue::Unsigned(raw)
            } else {
                FieldValue::Float(raw as f64 * spec.scale + spec.offset)
            }
        }
        FieldEncoding::SignedInt => {
            let signed = sign_extend(raw, spec.bit_width);
            if spec.identity_calibration() {
                FieldValue::Signed(signed)
            } else {
                FieldValue::Float(signed as f64 * spec.scale + spec.offset)
            }
        }
        FieldEncoding::Float => {
            let value = if spec.bit_width == 32 {
                f32::from_bits(raw as u32) as f64
            } else {
                f64::from_bits(raw)
            };
            FieldValue::Float(value * spec.scale + spec.offset)
        }
    }
}

fn sign_extend(raw: u64, bit_width: usize) -> i64 {
    if bit_width == 64 {
        return raw as i64;
    }
    let sign_bit = 1u64 << (bit_width - 1);
    if raw & sign_bit != 0 {
        (raw | !(sign_bit | (sign_bit - 1))) as i64
    } else {
        raw as i64
    }
}

/// Result of decoding one frame.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Extracted field values by name.
    pub fields: HashMap<String, FieldValue>,
    /// Checksum verdict; `None` when validation was not requested or the
    /// mission defines no checksum.
    pub checksum_valid: Option<bool>,
}

/// Stateless decoder for frames of one mission.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    mission: Arc<MissionProfile>,
    requested: Option<Vec<String>>,
    check_checksum: bool,
}

impl FrameDecoder {
    /// Decoder extracting every catalog field, checksum validation off.
    pub fn new(mission: Arc<MissionProfile>) -> Self {
        Self { mission, requested: None, check_checksum: false }
    }

    /// Restrict extraction to the named fields. Unknown names fail at
    /// decode time with a field extraction error.
    pub fn with_requested_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable checksum validation.
    pub fn with_checksum_validation(mut self, enabled: bool) -> Self {
        self.check_checksum = enabled;
        self
    }

    /// The mission profile this decoder targets.
    pub fn mission(&self) -> &Arc<MissionProfile> {
        &self.mission
    }

    /// Whether checksum validation is enabled.
    pub fn check_checksum(&self) -> bool {
        self.check_checksum
    }

    /// Decode one frame.
    ///
    /// A failed checksum does not abort decoding: fields are extracted
    /// either way and the verdict lands in
    /// [`DecodedFrame::checksum_valid`].
    pub fn decode(&self, frame: &[u8]) -> Result<DecodedFrame> {
        let layout = self.mission.layout();
        if frame.len() != layout.total_len() {
            return Err(TelemetryError::FrameLength {
                expected: layout.total_len(),
                actual: frame.len(),
            });
        }

        let checksum_valid =
            if self.check_checksum { self.mission.verify_frame_checksum(frame)? } else { None };

        let catalog = self.mission.catalog();
        let mut fields = HashMap::new();
        match &self.requested {
            Some(names) => {
                for name in names {
                    let spec = catalog.get(name).ok_or_else(|| {
                        TelemetryError::field_extraction(name, "not in the field catalog")
                    })?;
                    let raw = read_raw(frame, layout, spec)?;
                    fields.insert(spec.name.clone(), decode_value(spec, raw));
                }
            }
            None => {
                for spec in catalog.iter() {
                    let raw = read_raw(frame, layout, spec)?;
                    fields.insert(spec.name.clone(), decode_value(spec, raw));
                }
            }
        }

        Ok(DecodedFrame { fields, checksum_valid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldCatalog;
    use crate::checksum::ChecksumProfile;
    use crate::mission::{ByteOrder, ChecksumSpec};
    use proptest::prelude::*;

    fn spec(
        name: &str,
        section: &str,
        bit_offset: usize,
        bit_width: usize,
        encoding: FieldEncoding,
    ) -> FieldSpec {
        FieldSpec {
            name: name.into(),
            section: section.into(),
            bit_offset,
            bit_width,
            encoding,
            scale: 1.0,
            offset: 0.0,
            unit: String::new(),
        }
    }

    fn mission() -> Arc<MissionProfile> {
        let layout = FrameLayout::new([("HDR", 2usize), ("BODY", 8), ("CRC", 2)]).unwrap();
        let mut volts = spec("volts", "BODY", 32, 16, FieldEncoding::UnsignedInt);
        volts.scale = 0.5;
        volts.offset = -10.0;
        let catalog = FieldCatalog::new(
            [
                spec("seq", "HDR", 0, 16, FieldEncoding::UnsignedInt),
                spec("OBT", "BODY", 0, 32, FieldEncoding::UnsignedInt),
                volts,
                spec("temp", "BODY", 48, 8, FieldEncoding::SignedInt),
                spec("CRC", "CRC", 0, 16, FieldEncoding::UnsignedInt),
            ],
            &layout,
        )
        .unwrap();
        let checksum = ChecksumSpec {
            field: "CRC".into(),
            byte_order: ByteOrder::Big,
            profile: ChecksumProfile::BUYPASS,
            coverage: None,
        };
        Arc::new(MissionProfile::new("test", layout, catalog, Some(checksum)).unwrap())
    }

    fn frame(seq: u16, obt: u32, volts_raw: u16, temp: i8) -> Vec<u8> {
        let mut frame = vec![0u8; 12];
        frame[0..2].copy_from_slice(&seq.to_be_bytes());
        frame[2..6].copy_from_slice(&obt.to_be_bytes());
        frame[6..8].copy_from_slice(&volts_raw.to_be_bytes());
        frame[8] = temp as u8;
        let crc = ChecksumProfile::BUYPASS.compute(&frame[..10]);
        frame[10..12].copy_from_slice(&crc.to_be_bytes());
        frame
    }

    #[test]
    fn decodes_all_fields_by_default() {
        let decoder = FrameDecoder::new(mission());
        let decoded = decoder.decode(&frame(7, 1234, 40, -3)).unwrap();

        assert_eq!(decoded.fields["seq"], FieldValue::Unsigned(7));
        assert_eq!(decoded.fields["OBT"], FieldValue::Unsigned(1234));
        assert_eq!(decoded.fields["volts"], FieldValue::Float(40.0 * 0.5 - 10.0));
        assert_eq!(decoded.fields["temp"], FieldValue::Signed(-3));
        assert_eq!(decoded.checksum_valid, None);
    }

    #[test]
    fn requested_subset_only() {
        let decoder = FrameDecoder::new(mission()).with_requested_fields(["OBT"]);
        let decoded = decoder.decode(&frame(7, 99, 0, 0)).unwrap();
        assert_eq!(decoded.fields.len(), 1);
        assert_eq!(decoded.fields["OBT"], FieldValue::Unsigned(99));
    }

    #[test]
    fn unknown_requested_field_fails() {
        let decoder = FrameDecoder::new(mission()).with_requested_fields(["bogus"]);
        let err = decoder.decode(&frame(0, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, TelemetryError::FieldExtraction { .. }));
    }

    #[test]
    fn checksum_failure_does_not_abort_extraction() {
        let decoder = FrameDecoder::new(mission()).with_checksum_validation(true);
        let mut bad = frame(7, 1234, 40, 0);
        bad[4] ^= 0xFF;

        let decoded = decoder.decode(&bad).unwrap();
        assert_eq!(decoded.checksum_valid, Some(false));
        // Fields still extracted for inspection of the suspect frame.
        assert!(decoded.fields.contains_key("OBT"));

        let good = decoder.decode(&frame(7, 1234, 40, 0)).unwrap();
        assert_eq!(good.checksum_valid, Some(true));
    }

    #[test]
    fn wrong_length_frame_rejected() {
        let decoder = FrameDecoder::new(mission());
        let err = decoder.decode(&[0u8; 5]).unwrap_err();
        assert!(matches!(err, TelemetryError::FrameLength { expected: 12, actual: 5 }));
    }

    #[test]
    fn unaligned_bit_field_extraction() {
        // 5-bit field straddling the boundary of bytes 0 and 1.
        let layout = FrameLayout::new([("B", 2usize)]).unwrap();
        let s = spec("x", "B", 6, 5, FieldEncoding::UnsignedInt);
        // bits: 01000001 11000000 -> field at bits 6..11 = 0b01110
        let raw = read_raw(&[0b0100_0001, 0b1100_0000], &layout, &s).unwrap();
        assert_eq!(raw, 0b01110);
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0b1111, 4), -1);
        assert_eq!(sign_extend(0b0111, 4), 7);
        assert_eq!(sign_extend(0b1000, 4), -8);
        assert_eq!(sign_extend(u64::MAX, 64), -1);
        assert_eq!(sign_extend(0, 64), 0);
    }

    #[test]
    fn float_encoding_decodes_ieee754() {
        let layout = FrameLayout::new([("B", 4usize)]).unwrap();
        let s = spec("f", "B", 0, 32, FieldEncoding::Float);
        let catalog = FieldCatalog::new([s], &layout).unwrap();
        let mission =
            Arc::new(MissionProfile::new("float", layout, catalog, None).unwrap());

        let bytes = 42.5f32.to_be_bytes();
        let decoded = FrameDecoder::new(mission).decode(&bytes).unwrap();
        assert_eq!(decoded.fields["f"], FieldValue::Float(42.5));
    }

    proptest! {
        // Decoding is a pure function: the same bytes decode to identical
        // results every time.
        #[test]
        fn prop_decode_is_idempotent(
            seq in any::<u16>(),
            obt in any::<u32>(),
            volts in any::<u16>(),
            temp in any::<i8>(),
        ) {
            let decoder = FrameDecoder::new(mission()).with_checksum_validation(true);
            let frame = frame(seq, obt, volts, temp);

            let first = decoder.decode(&frame).unwrap();
            let second = decoder.decode(&frame).unwrap();

            prop_assert_eq!(&first.fields, &second.fields);
            prop_assert_eq!(first.checksum_valid, second.checksum_valid);
            prop_assert_eq!(first.checksum_valid, Some(true));
            prop_assert_eq!(first.fields["OBT"], FieldValue::Unsigned(obt as u64));
        }

        // Byte-aligned big-endian extraction agrees with u32::from_be_bytes.
        #[test]
        fn prop_aligned_extraction_matches_be_bytes(word in any::<u32>(), tail in any::<u32>()) {
            let layout = FrameLayout::new([("B", 8usize)]).unwrap();
            let s = spec("w", "B", 0, 32, FieldEncoding::UnsignedInt);
            let mut bytes = Vec::new();
            bytes.extend_from_slice(&word.to_be_bytes());
            bytes.extend_from_slice(&tail.to_be_bytes());
            prop_assert_eq!(read_raw(&bytes, &layout, &s).unwrap(), word as u64);
        }
    }
}
