//! Lazy packet stream over a capture buffer.
//!
//! [`PacketStream`] slices fixed-length frames from a shared buffer,
//! decodes each through [`FrameDecoder`], and yields
//! `Result<Packet>` items lazily — stopping early is as cheap as
//! dropping the iterator, so a caller that only needs a prefix never
//! pays for the rest of the capture.
//!
//! Trailing bytes that do not form a whole frame terminate the stream
//! normally; the discarded count is surfaced through the optional
//! partial-data hook rather than an error. Per-frame decode errors follow
//! the configured [`ErrorPolicy`].

use std::sync::Arc;
use tracing::{debug, warn};

use crate::decoder::FrameDecoder;
use crate::mission::MissionProfile;
use crate::types::Packet;
use crate::{Result, TelemetryError};

/// What to do when one frame fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Propagate the first error and end the stream.
    FailFast,
    /// Yield the error for that index and continue with the next frame.
    #[default]
    Collect,
}

type PartialHook = Box<dyn FnMut(usize) + Send>;
type ChecksumHook = Box<dyn FnMut(usize, bool) + Send>;

/// Iterator of decoded packets over a fixed-frame capture buffer.
pub struct PacketStream {
    buffer: Arc<[u8]>,
    decoder: FrameDecoder,
    policy: ErrorPolicy,
    index: usize,
    offset: usize,
    finished: bool,
    on_partial: Option<PartialHook>,
    on_checksum: Option<ChecksumHook>,
}

impl PacketStream {
    /// Stream over `buffer` decoding every catalog field, checksum
    /// validation off, collecting error policy.
    pub fn new(buffer: impl Into<Arc<[u8]>>, mission: Arc<MissionProfile>) -> Self {
        Self::with_decoder(buffer, FrameDecoder::new(mission))
    }

    /// Stream using a pre-configured decoder.
    pub fn with_decoder(buffer: impl Into<Arc<[u8]>>, decoder: FrameDecoder) -> Self {
        Self {
            buffer: buffer.into(),
            decoder,
            policy: ErrorPolicy::default(),
            index: 0,
            offset: 0,
            finished: false,
            on_partial: None,
            on_checksum: None,
        }
    }

    /// Enable or disable checksum validation.
    pub fn with_checksum_validation(mut self, enabled: bool) -> Self {
        self.decoder = self.decoder.with_checksum_validation(enabled);
        self
    }

    /// Restrict extraction to the named fields.
    pub fn with_requested_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.decoder = self.decoder.with_requested_fields(fields);
        self
    }

    /// Set the per-frame error policy.
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Hook invoked once with the count of trailing bytes discarded at
    /// the end of the buffer, if any.
    pub fn on_partial<F>(mut self, hook: F) -> Self
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.on_partial = Some(Box::new(hook));
        self
    }

    /// Hook invoked with `(index, valid)` for every validated frame.
    pub fn on_checksum<F>(mut self, hook: F) -> Self
    where
        F: FnMut(usize, bool) + Send + 'static,
    {
        self.on_checksum = Some(Box::new(hook));
        self
    }

    /// Number of whole frames in the buffer.
    pub fn total_frames(&self) -> usize {
        self.buffer.len() / self.frame_len()
    }

    /// Count of trailing bytes that do not form a whole frame.
    pub fn trailing_len(&self) -> usize {
        self.buffer.len() % self.frame_len()
    }

    /// Drain the stream into a vector.
    ///
    /// Under [`ErrorPolicy::FailFast`] the first frame error is
    /// propagated; under [`ErrorPolicy::Collect`] failed frames are
    /// skipped (each is logged with its index and offset by the
    /// iterator).
    pub fn decode_all(mut self) -> Result<Vec<Packet>> {
        let mut packets = Vec::with_capacity(self.total_frames());
        while let Some(item) = self.next() {
            match item {
                Ok(packet) => packets.push(packet),
                Err(err) => match self.policy {
                    ErrorPolicy::FailFast => return Err(err),
                    ErrorPolicy::Collect => {}
                },
            }
        }
        Ok(packets)
    }

    fn frame_len(&self) -> usize {
        self.decoder.mission().layout().total_len()
    }
}

impl Iterator for PacketStream {
    type Item = Result<Packet, TelemetryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let frame_len = self.frame_len();
        let remaining = self.buffer.len() - self.offset;
        if remaining < frame_len {
            self.finished = true;
            if remaining > 0 {
                debug!(discarded = remaining, "trailing bytes do not form a whole frame");
                if let Some(hook) = &mut self.on_partial {
                    hook(remaining);
                }
            }
            return None;
        }

        let index = self.index;
        let offset = self.offset;
        self.index += 1;
        self.offset += frame_len;

        let frame = &self.buffer[offset..offset + frame_len];
        match self.decoder.decode(frame) {
            Ok(decoded) => {
                if let Some(valid) = decoded.checksum_valid {
                    if !valid {
                        warn!(index, offset, "checksum mismatch");
                    }
                    if let Some(hook) = &mut self.on_checksum {
                        hook(index, valid);
                    }
                }
                Some(Ok(Packet::new(
                    index,
                    offset,
                    decoded.checksum_valid,
                    decoded.fields,
                    Arc::clone(&self.buffer),
                    Arc::clone(self.decoder.mission()),
                )))
            }
            Err(err) => {
                let err = err.at_frame(index, offset);
                match self.policy {
                    ErrorPolicy::FailFast => self.finished = true,
                    ErrorPolicy::Collect => warn!(index, offset, "skipping undecodable frame"),
                }
                Some(Err(err))
            }
        }
    }
}
