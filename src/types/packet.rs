//! Decoded packet record.

use std::collections::HashMap;
use std::sync::Arc;

use crate::mission::MissionProfile;

use super::FieldValue;

/// One decoded telemetry packet.
///
/// A packet is immutable once decoded. It shares the capture buffer
/// (zero-copy via `Arc`), so section access is O(1) slicing without
/// duplicating frame bytes.
#[derive(Debug, Clone)]
pub struct Packet {
    /// 0-based position of the frame in the capture stream.
    pub index: usize,
    /// Byte offset of the frame within the capture buffer.
    pub source_offset: usize,
    /// Checksum verdict; `None` when validation was not requested.
    /// A failed checksum does not prevent field extraction.
    pub checksum_valid: Option<bool>,
    /// Decoded field values by name.
    pub fields: HashMap<String, FieldValue>,

    buffer: Arc<[u8]>,
    mission: Arc<MissionProfile>,
}

impl Packet {
    pub(crate) fn new(
        index: usize,
        source_offset: usize,
        checksum_valid: Option<bool>,
        fields: HashMap<String, FieldValue>,
        buffer: Arc<[u8]>,
        mission: Arc<MissionProfile>,
    ) -> Self {
        Self { index, source_offset, checksum_valid, fields, buffer, mission }
    }

    /// Raw bytes of the whole frame.
    pub fn frame_bytes(&self) -> &[u8] {
        let len = self.mission.layout().total_len();
        &self.buffer[self.source_offset..self.source_offset + len]
    }

    /// Raw bytes of a named section, or `None` for an unknown name.
    pub fn section(&self, name: &str) -> Option<&[u8]> {
        let range = self.mission.layout().range_of(name)?;
        Some(&self.frame_bytes()[range])
    }

    /// Decoded value of a field, or `None` if it was not requested.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields.get(name).copied()
    }

    /// Convenience numeric lookup.
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.field(name).map(|v| v.as_f64())
    }

    /// The mission profile this packet was decoded against.
    pub fn mission(&self) -> &MissionProfile {
        &self.mission
    }
}
