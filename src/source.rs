//! Packet source seam for the connection layer.

use async_trait::async_trait;

use crate::Result;
use crate::stream::PacketStream;
use crate::types::Packet;

/// Trait for packet producers feeding a subscription.
///
/// Sources abstract over where decoded packets come from — an in-memory
/// capture today, a live downlink feed later — so the connection layer
/// does not care. `Ok(None)` signals normal end of stream; per-frame
/// decode errors are yielded as `Err` and the source decides whether
/// further packets follow (see the stream error policy).
#[async_trait]
pub trait PacketSource: Send + 'static {
    /// Produce the next decoded packet.
    async fn next_packet(&mut self) -> Result<Option<Packet>>;
}

/// Packet source over an in-memory capture buffer.
pub struct BufferSource {
    stream: PacketStream,
}

impl BufferSource {
    /// Wrap a configured [`PacketStream`].
    pub fn new(stream: PacketStream) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl PacketSource for BufferSource {
    async fn next_packet(&mut self) -> Result<Option<Packet>> {
        self.stream.next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mini_frame, mini_mission};

    #[tokio::test]
    async fn buffer_source_drains_to_none() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&mini_frame(5, 1));
        buffer.extend_from_slice(&mini_frame(6, 2));

        let mut source = BufferSource::new(PacketStream::new(buffer, mini_mission()));

        let first = source.next_packet().await.unwrap().unwrap();
        assert_eq!(first.f64("OBT"), Some(5.0));
        let second = source.next_packet().await.unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert!(source.next_packet().await.unwrap().is_none());
    }
}
