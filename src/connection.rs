//! Replay connection over a captured downlink.
//!
//! A [`ReplayConnection`] owns the capture buffer and hands out
//! subscriptions: asynchronous streams of decoded packets in frame-index
//! order. Dropping a subscription or calling [`ReplayConnection::shutdown`]
//! stops decoding — the remainder of the buffer is never touched, so
//! taking a prefix of a large capture is cheap.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::mission::MissionProfile;
use crate::orderer::order_by_field;
use crate::source::{BufferSource, PacketSource};
use crate::stream::{ErrorPolicy, PacketStream};
use crate::types::Packet;
use crate::{Result, TelemetryError};

/// Decode configuration for one subscription.
#[derive(Debug, Clone, Default)]
pub struct SubscribeOptions {
    /// Fields to extract; `None` extracts the whole catalog.
    pub requested_fields: Option<Vec<String>>,
    /// Validate the frame checksum and record the verdict per packet.
    pub check_checksum: bool,
    /// Per-frame error policy.
    pub policy: ErrorPolicy,
}

/// Connection to a captured downlink, decoding against one mission.
#[derive(Debug)]
pub struct ReplayConnection {
    buffer: Arc<[u8]>,
    mission: Arc<MissionProfile>,
    cancel: CancellationToken,
}

impl ReplayConnection {
    /// Read a capture file into memory and wrap it in a connection.
    pub async fn open<P: AsRef<Path>>(path: P, mission: Arc<MissionProfile>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())
            .map_err(|e| TelemetryError::file_error(path.as_ref().to_path_buf(), e))?;
        Ok(Self::from_bytes(data, mission))
    }

    /// Wrap an already-loaded capture buffer.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>, mission: Arc<MissionProfile>) -> Self {
        let buffer = bytes.into();
        let frame_len = mission.layout().total_len();
        info!(
            mission = mission.name(),
            frames = buffer.len() / frame_len,
            trailing = buffer.len() % frame_len,
            "capture loaded"
        );
        Self { buffer, mission, cancel: CancellationToken::new() }
    }

    /// The mission profile frames are decoded against.
    pub fn mission(&self) -> &Arc<MissionProfile> {
        &self.mission
    }

    /// Number of whole frames in the capture.
    pub fn total_frames(&self) -> usize {
        self.buffer.len() / self.mission.layout().total_len()
    }

    /// Subscribe to the decoded packet stream.
    ///
    /// Packets arrive in frame-index order. The producer stops when the
    /// capture is exhausted, the subscription is dropped, or the
    /// connection is shut down.
    pub fn subscribe(&self, options: SubscribeOptions) -> ReceiverStream<Result<Packet>> {
        let mut source = BufferSource::new(self.packet_stream(&options));
        let (tx, rx) = mpsc::channel(64);
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("subscription cancelled");
                        break;
                    }
                    next = source.next_packet() => match next {
                        Ok(Some(packet)) => {
                            if tx.send(Ok(packet)).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(err) => {
                            if tx.send(Err(err)).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        ReceiverStream::new(rx)
    }

    /// Decode the whole capture synchronously.
    pub fn decode_all(&self, options: SubscribeOptions) -> Result<Vec<Packet>> {
        self.packet_stream(&options).decode_all()
    }

    /// Decode the whole capture and sort it by `key_field`.
    pub fn decode_ordered(&self, options: SubscribeOptions, key_field: &str) -> Result<Vec<Packet>> {
        order_by_field(self.decode_all(options)?, key_field)
    }

    /// Stop all subscriptions on this connection.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn packet_stream(&self, options: &SubscribeOptions) -> PacketStream {
        let mut stream = PacketStream::new(Arc::clone(&self.buffer), Arc::clone(&self.mission))
            .with_checksum_validation(options.check_checksum)
            .with_policy(options.policy);
        if let Some(fields) = &options.requested_fields {
            stream = stream.with_requested_fields(fields.iter().cloned());
        }
        stream
    }
}
