//! Decoded telemetry value representation.

use serde::{Deserialize, Serialize};

/// Runtime value of a decoded telemetry field.
///
/// Fields with an identity calibration (`scale == 1`, `offset == 0`) keep
/// their exact integer representation; calibrated fields and float-encoded
/// fields become `Float`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Raw unsigned integer field.
    Unsigned(u64),
    /// Raw two's-complement signed integer field.
    Signed(i64),
    /// Calibrated or float-encoded field.
    Float(f64),
}

impl FieldValue {
    /// Numeric value as `f64`, the common domain for ordering and
    /// presentation. Unsigned values above 2^53 lose precision here;
    /// onboard counters are well below that.
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Unsigned(v) => v as f64,
            FieldValue::Signed(v) => v as f64,
            FieldValue::Float(v) => v,
        }
    }

    /// Exact unsigned value, if this is an `Unsigned` field.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            FieldValue::Unsigned(v) => Some(v),
            _ => None,
        }
    }

    /// Exact signed value, if this is a `Signed` field.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::Signed(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(FieldValue::Unsigned(42).as_f64(), 42.0);
        assert_eq!(FieldValue::Signed(-7).as_f64(), -7.0);
        assert_eq!(FieldValue::Float(1.5).as_f64(), 1.5);

        assert_eq!(FieldValue::Unsigned(42).as_u64(), Some(42));
        assert_eq!(FieldValue::Float(1.5).as_u64(), None);
        assert_eq!(FieldValue::Signed(-7).as_i64(), Some(-7));
        assert_eq!(FieldValue::Unsigned(1).as_i64(), None);
    }
}
