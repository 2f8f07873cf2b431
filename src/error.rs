//! Error types for downlink telemetry decoding.
//!
//! All fatal failure modes of the crate are expressed through a single
//! [`TelemetryError`] enum. The split follows the decode pipeline:
//!
//! - **Configuration errors** are raised when a mission profile (frame
//!   layout, field catalog, checksum convention) is constructed, never
//!   during decode. A profile that constructs successfully cannot produce
//!   layout errors later.
//! - **Per-frame errors** (`FieldExtraction`, `FrameLength`) concern one
//!   frame and are wrapped with the frame's index and byte offset by the
//!   stream layer, so every failure is attributable to a position in the
//!   capture.
//! - Checksum mismatches are deliberately **not** errors: they are
//!   recorded on the decoded packet (`Packet::checksum_valid`) so suspect
//!   frames can still be inspected.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for downlink decoding operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    /// Invalid mission configuration (overlapping sections, out-of-bounds
    /// field, unknown checksum field). Raised at construction time only.
    #[error("invalid mission configuration: {reason}")]
    Configuration {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A requested field could not be extracted from a frame.
    #[error("cannot extract field '{field}': {details}")]
    FieldExtraction { field: String, details: String },

    /// A frame slice does not match the layout's fixed length.
    #[error("frame is {actual} bytes, layout expects {expected}")]
    FrameLength { expected: usize, actual: usize },

    /// Per-frame context wrapper attached by the stream layer.
    #[error("frame {index} (offset {offset:#x}): {source}")]
    Frame {
        index: usize,
        offset: usize,
        #[source]
        source: Box<TelemetryError>,
    },

    /// Ordering key absent from a decoded packet.
    #[error("ordering field '{field}' missing from packet {index}")]
    MissingField { field: String, index: usize },

    /// Capture file could not be read.
    #[error("capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TelemetryError {
    /// Helper constructor for configuration errors.
    pub fn configuration(reason: impl Into<String>) -> Self {
        TelemetryError::Configuration { reason: reason.into(), source: None }
    }

    /// Helper constructor for field extraction errors.
    pub fn field_extraction(field: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::FieldExtraction { field: field.into(), details: details.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Wrap this error with the index and source offset of the frame it
    /// occurred in. Already-wrapped errors are returned unchanged so the
    /// innermost frame context wins.
    pub fn at_frame(self, index: usize, offset: usize) -> Self {
        match self {
            wrapped @ TelemetryError::Frame { .. } => wrapped,
            other => TelemetryError::Frame { index, offset, source: Box::new(other) },
        }
    }

    /// The frame index this error is attributable to, if any.
    pub fn frame_index(&self) -> Option<usize> {
        match self {
            TelemetryError::Frame { index, .. } => Some(*index),
            TelemetryError::MissingField { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<serde_yaml_ng::Error> for TelemetryError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        TelemetryError::Configuration {
            reason: "mission profile document rejected".to_string(),
            source: Some(Box::new(err)),
        }
    }
}
