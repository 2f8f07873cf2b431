//! Mission profiles: layout + catalog + checksum convention as one value.
//!
//! A mission is configuration, not a subclass: a [`MissionProfile`]
//! bundles a validated [`FrameLayout`], a [`FieldCatalog`] and an
//! optional [`ChecksumSpec`]. Supporting a new downlink format means
//! constructing a new profile value, in code or from a YAML document —
//! the decoder itself never changes.
//!
//! The built-in [`MissionProfile::sacd`] profile reproduces the
//! SAC-D/Aquarius housekeeping frame: 4000 bytes, thirteen sections, a
//! CRC-16/BUYPASS trailer covering every preceding byte, and onboard time
//! counted in GPS seconds.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::{FieldCatalog, FieldEncoding, FieldSpec};
use crate::checksum::ChecksumProfile;
use crate::decoder;
use crate::layout::FrameLayout;
use crate::{Result, TelemetryError};

/// Conventional name of the onboard-time field in shipped profiles.
pub const ONBOARD_TIME_FIELD: &str = "OBT";

/// Byte order of the stored checksum trailer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Most significant byte first.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

/// Where the frame checksum lives and how it is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecksumSpec {
    /// Catalog field holding the stored checksum (16-bit unsigned).
    pub field: String,
    /// Byte order of the stored value.
    #[serde(default)]
    pub byte_order: ByteOrder,
    /// CRC parameterization.
    #[serde(default)]
    pub profile: ChecksumProfile,
    /// Byte range the checksum covers. When absent, every frame byte
    /// preceding the checksum field is covered.
    #[serde(default)]
    pub coverage: Option<Range<usize>>,
}

/// Immutable bundle of everything needed to decode one mission's frames.
#[derive(Debug)]
pub struct MissionProfile {
    name: String,
    layout: FrameLayout,
    catalog: FieldCatalog,
    checksum: Option<ChecksumSpec>,
}

impl MissionProfile {
    /// Assemble a profile, validating the checksum convention against the
    /// layout and catalog.
    pub fn new(
        name: impl Into<String>,
        layout: FrameLayout,
        catalog: FieldCatalog,
        checksum: Option<ChecksumSpec>,
    ) -> Result<Self> {
        if let Some(spec) = &checksum {
            let field = catalog.get(&spec.field).ok_or_else(|| {
                TelemetryError::configuration(format!(
                    "checksum field '{}' is not in the catalog",
                    spec.field
                ))
            })?;
            if field.bit_width != 16 || field.encoding != FieldEncoding::UnsignedInt {
                return Err(TelemetryError::configuration(format!(
                    "checksum field '{}' must be a 16-bit unsigned field",
                    spec.field
                )));
            }
            if let Some(range) = &spec.coverage {
                if range.start > range.end || range.end > layout.total_len() {
                    return Err(TelemetryError::configuration(format!(
                        "checksum coverage {}..{} exceeds the {}-byte frame",
                        range.start,
                        range.end,
                        layout.total_len()
                    )));
                }
            }
        }
        Ok(Self { name: name.into(), layout, catalog, checksum })
    }

    /// Mission name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The frame layout.
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// The field catalog.
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// The checksum convention, if the mission defines one.
    pub fn checksum(&self) -> Option<&ChecksumSpec> {
        self.checksum.as_ref()
    }

    /// Resolved checksum coverage: the explicit range when configured,
    /// otherwise every byte preceding the checksum field.
    pub fn checksum_coverage(&self) -> Option<Range<usize>> {
        let spec = self.checksum.as_ref()?;
        if let Some(range) = &spec.coverage {
            return Some(range.clone());
        }
        let field = self.catalog.get(&spec.field)?;
        let trailer_start = field.frame_byte_offset(&self.layout)?;
        Some(0..trailer_start)
    }

    /// Verify one frame against the mission checksum.
    ///
    /// Returns `Ok(None)` when the mission defines no checksum. A
    /// mismatch is reported as `Ok(Some(false))`, never as an error, so
    /// callers can keep decoding suspect frames.
    pub fn verify_frame_checksum(&self, frame: &[u8]) -> Result<Option<bool>> {
        let Some(spec) = &self.checksum else {
            return Ok(None);
        };
        let field = self.catalog.get(&spec.field).ok_or_else(|| {
            TelemetryError::field_extraction(&spec.field, "checksum field missing from catalog")
        })?;

        let stored = decoder::read_raw(frame, &self.layout, field)? as u16;
        let stored = match spec.byte_order {
            ByteOrder::Big => stored,
            ByteOrder::Little => stored.swap_bytes(),
        };

        let covered = match &spec.coverage {
            Some(range) => range.clone(),
            None => {
                let trailer_start = field.frame_byte_offset(&self.layout).ok_or_else(|| {
                    TelemetryError::field_extraction(&spec.field, "checksum section not in layout")
                })?;
                0..trailer_start
            }
        };
        let data = frame.get(covered).ok_or(TelemetryError::FrameLength {
            expected: self.layout.total_len(),
            actual: frame.len(),
        })?;
        let computed = spec.profile.compute(data);
        Ok(Some(computed == stored))
    }

    /// Parse and validate a profile from a YAML document.
    pub fn from_yaml(doc: &str) -> Result<Self> {
        let doc: ProfileDoc = serde_yaml_ng::from_str(doc)?;
        let layout = FrameLayout::new(doc.frame.into_iter().map(|s| (s.name, s.length)))?;
        let catalog = FieldCatalog::new(doc.fields, &layout)?;
        Self::new(doc.name, layout, catalog, doc.checksum)
    }

    /// Read and parse a profile from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = std::fs::read_to_string(&path)
            .map_err(|e| TelemetryError::file_error(path.as_ref().to_path_buf(), e))?;
        Self::from_yaml(&doc)
    }

    /// The SAC-D/Aquarius housekeeping frame profile: thirteen sections
    /// totalling 4000 bytes with a big-endian CRC-16/BUYPASS trailer.
    pub fn sacd() -> Arc<Self> {
        let layout = FrameLayout::new([
            ("IDS", 3usize),
            ("FRAME#", 4),
            ("HK_ID", 1),
            ("CDH", 272),
            ("MM1", 150),
            ("MM2", 150),
            ("ACS", 1024),
            ("PCS", 1024),
            ("AQUARIUS", 500),
            ("HSC", 120),
            ("TDP", 150),
            ("PAD", 600),
            ("CRC", 2),
        ]);

        let fields = [
            // Onboard time: GPS seconds at byte 92 of the CDH section.
            field("OBT", "CDH", 92 * 8, 32, FieldEncoding::UnsignedInt, 1.0, 0.0, "GPS s"),
            field("OBT_s", "CDH", 92 * 8, 32, FieldEncoding::UnsignedInt, 1.0, 0.0, "s"),
            field(
                "vBatAverage",
                "PCS",
                750 * 8,
                16,
                FieldEncoding::UnsignedInt,
                0.018_731_28,
                -38.682_956,
                "V",
            ),
            field("CRC", "CRC", 0, 16, FieldEncoding::UnsignedInt, 1.0, 0.0, ""),
        ];

        let checksum = ChecksumSpec {
            field: "CRC".to_string(),
            byte_order: ByteOrder::Big,
            profile: ChecksumProfile::BUYPASS,
            coverage: None,
        };

        let profile = layout
            .and_then(|layout| {
                let catalog = FieldCatalog::new(fields, &layout)?;
                Self::new("sacd", layout, catalog, Some(checksum))
            })
            .expect("built-in SAC-D profile table is valid");
        Arc::new(profile)
    }
}

#[allow(clippy::too_many_arguments)]
fn field(
    name: &str,
    section: &str,
    bit_offset: usize,
    bit_width: usize,
    encoding: FieldEncoding,
    scale: f64,
    offset: f64,
    unit: &str,
) -> FieldSpec {
    FieldSpec {
        name: name.to_string(),
        section: section.to_string(),
        bit_offset,
        bit_width,
        encoding,
        scale,
        offset,
        unit: unit.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ProfileDoc {
    name: String,
    frame: Vec<SectionDoc>,
    fields: Vec<FieldSpec>,
    #[serde(default)]
    checksum: Option<ChecksumSpec>,
}

#[derive(Debug, Deserialize)]
struct SectionDoc {
    name: String,
    length: usize,
}
