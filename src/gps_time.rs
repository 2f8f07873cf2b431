//! Onboard-time to calendar-time conversion.
//!
//! Onboard clocks count seconds since the GPS epoch,
//! 1980-01-06T00:00:00 UTC. The conversion here is a plain epoch offset:
//! it does **not** apply the GPS–UTC leap-second correction, matching the
//! convention of the downlink it decodes. Callers needing true UTC must
//! subtract the leap-second count themselves.

use chrono::{DateTime, TimeZone, Utc};

/// Unix timestamp of the GPS epoch (1980-01-06T00:00:00Z).
pub const GPS_EPOCH_UNIX_SECONDS: i64 = 315_964_800;

/// The GPS epoch as a calendar timestamp.
pub fn gps_epoch() -> DateTime<Utc> {
    Utc.timestamp_nanos(GPS_EPOCH_UNIX_SECONDS * 1_000_000_000)
}

/// Convert seconds since the GPS epoch to a calendar timestamp.
///
/// Deterministic, no I/O, sub-second precision preserved to the
/// nanosecond. No leap-second correction is applied.
pub fn gps_to_utc(seconds_since_gps_epoch: f64) -> DateTime<Utc> {
    let offset_nanos = (seconds_since_gps_epoch * 1e9).round() as i64;
    Utc.timestamp_nanos(GPS_EPOCH_UNIX_SECONDS * 1_000_000_000 + offset_nanos)
}
