//! Declarative decoder for fixed-layout spacecraft telemetry downlink
//! frames.
//!
//! A downlink capture is a concatenation of fixed-length frames, each
//! split into named byte sections with a 16-bit CRC trailer. This crate
//! decodes such captures into structured packets:
//!
//! - **Mission profiles**: a [`MissionProfile`] bundles a [`FrameLayout`]
//!   (named byte sections), a [`FieldCatalog`] (named bit ranges with
//!   scale/offset calibration) and a [`ChecksumSpec`]. Supporting a new
//!   downlink format is a new profile value — in code or YAML — not new
//!   decoder code. Every structural mistake is caught when the profile
//!   is constructed, never mid-decode.
//! - **Decoding**: [`PacketStream`] lazily slices frames out of a capture
//!   buffer and decodes each into a [`Packet`] with zero-copy section
//!   views, per-packet checksum verdicts and per-frame error reporting.
//! - **Ordering**: [`order_by_onboard_time`] stably sorts decoded packets
//!   by the onboard clock; [`gps_to_utc`] maps onboard seconds to
//!   calendar time.
//! - **Streaming**: a [`ReplayConnection`] wraps a capture in an async
//!   subscription with cancellation, for consumers that want packets as
//!   a `Stream`.
//!
//! # Example
//!
//! ```rust
//! use downlink::{MissionProfile, PacketStream, order_by_onboard_time};
//!
//! fn decode(capture: Vec<u8>) -> downlink::Result<()> {
//!     let mission = MissionProfile::sacd();
//!     let packets = PacketStream::new(capture, mission)
//!         .with_checksum_validation(true)
//!         .decode_all()?;
//!
//!     for packet in order_by_onboard_time(packets)? {
//!         println!(
//!             "packet {} OBT={:?} checksum_ok={:?}",
//!             packet.index,
//!             packet.f64("OBT"),
//!             packet.checksum_valid
//!         );
//!     }
//!     Ok(())
//! }
//! ```

mod catalog;
mod checksum;
mod connection;
mod decoder;
mod error;
mod gps_time;
mod layout;
mod mission;
mod orderer;
mod source;
mod stream;
#[cfg(test)]
mod test_utils;
pub mod types;

pub use catalog::{FieldCatalog, FieldEncoding, FieldSpec};
pub use checksum::ChecksumProfile;
pub use connection::{ReplayConnection, SubscribeOptions};
pub use decoder::{DecodedFrame, FrameDecoder};
pub use error::{Result, TelemetryError};
pub use gps_time::{GPS_EPOCH_UNIX_SECONDS, gps_epoch, gps_to_utc};
pub use layout::{FrameLayout, Section};
pub use mission::{ByteOrder, ChecksumSpec, MissionProfile, ONBOARD_TIME_FIELD};
pub use orderer::{order_by_field, order_by_onboard_time};
pub use source::{BufferSource, PacketSource};
pub use stream::{ErrorPolicy, PacketStream};
pub use types::{FieldValue, Packet};

use std::path::Path;
use std::sync::Arc;

/// Unified entry point for downlink captures.
///
/// # Examples
///
/// ```rust,no_run
/// use downlink::{Downlink, MissionProfile, SubscribeOptions};
/// use futures::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> downlink::Result<()> {
///     let connection = Downlink::open("pass_2024_117.bin", MissionProfile::sacd()).await?;
///     let mut packets = connection.subscribe(SubscribeOptions::default());
///
///     while let Some(packet) = packets.next().await {
///         let packet = packet?;
///         println!("OBT {:?}", packet.f64("OBT"));
///     }
///     Ok(())
/// }
/// ```
pub struct Downlink;

impl Downlink {
    /// Open a capture file for replay decoding.
    pub async fn open<P: AsRef<Path>>(
        path: P,
        mission: Arc<MissionProfile>,
    ) -> Result<ReplayConnection> {
        ReplayConnection::open(path, mission).await
    }

    /// Wrap an in-memory capture buffer.
    pub fn from_bytes(
        bytes: impl Into<Arc<[u8]>>,
        mission: Arc<MissionProfile>,
    ) -> ReplayConnection {
        ReplayConnection::from_bytes(bytes, mission)
    }
}
