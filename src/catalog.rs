//! Field catalog: declarative mapping from field names to bit ranges.
//!
//! A [`FieldSpec`] names a bit range inside one layout section, the
//! encoding of those bits, and a linear calibration
//! (`value = raw * scale + offset`). The [`FieldCatalog`] validates every
//! spec against a [`FrameLayout`] at construction, turning layout mistakes
//! into start-up errors instead of silent mis-decodes.
//!
//! Bit addressing is big-endian, most-significant-bit-first: bit 0 is the
//! MSB of the section's first byte, matching the telemetry standard the
//! downlink frames follow. The checksum trailer and the onboard-time
//! counter are ordinary catalog entries; only the decode logic treats
//! them specially.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::layout::FrameLayout;
use crate::{Result, TelemetryError};

/// How the raw bits of a field map to a numeric domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldEncoding {
    /// Unsigned big-endian integer.
    UnsignedInt,
    /// Two's-complement signed big-endian integer.
    SignedInt,
    /// IEEE-754 binary32/binary64; bit width must be 32 or 64.
    Float,
}

fn default_scale() -> f64 {
    1.0
}

/// Declarative description of one telemetry field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, unique within the catalog.
    pub name: String,
    /// Name of the layout section the field lives in.
    pub section: String,
    /// Bit offset within the section, MSB-first from the section start.
    pub bit_offset: usize,
    /// Field width in bits, 1..=64.
    pub bit_width: usize,
    /// Raw bit interpretation.
    pub encoding: FieldEncoding,
    /// Linear calibration factor.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Linear calibration offset.
    #[serde(default)]
    pub offset: f64,
    /// Engineering unit, informational only.
    #[serde(default)]
    pub unit: String,
}

impl FieldSpec {
    /// Whether the calibration leaves raw values untouched.
    pub fn identity_calibration(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }

    /// Byte offset of the field's first bit within the whole frame.
    /// Used to derive the default checksum coverage boundary.
    pub(crate) fn frame_byte_offset(&self, layout: &FrameLayout) -> Option<usize> {
        let section = layout.section(&self.section)?;
        Some(section.start + self.bit_offset / 8)
    }

    fn validate(&self, layout: &FrameLayout) -> Result<()> {
        let section = layout.section(&self.section).ok_or_else(|| {
            TelemetryError::configuration(format!(
                "field '{}' references unknown section '{}'",
                self.name, self.section
            ))
        })?;

        if self.bit_width == 0 || self.bit_width > 64 {
            return Err(TelemetryError::configuration(format!(
                "field '{}' has unsupported bit width {}",
                self.name, self.bit_width
            )));
        }
        if self.encoding == FieldEncoding::Float && self.bit_width != 32 && self.bit_width != 64 {
            return Err(TelemetryError::configuration(format!(
                "float field '{}' must be 32 or 64 bits wide, got {}",
                self.name, self.bit_width
            )));
        }

        let section_bits = section.length * 8;
        let end = self.bit_offset.checked_add(self.bit_width).ok_or_else(|| {
            TelemetryError::configuration(format!("field '{}' bit range overflows", self.name))
        })?;
        if end > section_bits {
            return Err(TelemetryError::configuration(format!(
                "field '{}' spans bits {}..{} but section '{}' is {} bits long",
                self.name, self.bit_offset, end, self.section, section_bits
            )));
        }
        if !self.scale.is_finite() || !self.offset.is_finite() {
            return Err(TelemetryError::configuration(format!(
                "field '{}' has a non-finite calibration",
                self.name
            )));
        }
        Ok(())
    }
}

/// Validated mapping from field name to [`FieldSpec`].
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    fields: HashMap<String, FieldSpec>,
}

impl FieldCatalog {
    /// Build a catalog, validating every field against the layout.
    pub fn new<I>(fields: I, layout: &FrameLayout) -> Result<Self>
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        let mut map = HashMap::new();
        for spec in fields {
            spec.validate(layout)?;
            let name = spec.name.clone();
            if map.insert(name.clone(), spec).is_some() {
                return Err(TelemetryError::configuration(format!(
                    "duplicate field name '{name}'"
                )));
            }
        }
        Ok(Self { fields: map })
    }

    /// Look up a field spec by name (O(1)).
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Whether a field exists.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names, in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// All field specs, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the catalog has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
