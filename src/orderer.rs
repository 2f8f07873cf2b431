//! Chronological ordering of decoded packets.
//!
//! Downlinked frames arrive in transmission order, which is not onboard
//! chronological order after tape dumps and retransmissions. Ordering
//! sorts a decoded collection by the numeric value of a key field
//! (conventionally the onboard-time counter) with a **stable** sort:
//! packets with equal key values keep their relative input order, so
//! duplicate onboard-time values — common in real telemetry — stay
//! attributable to their original stream positions.

use crate::mission::ONBOARD_TIME_FIELD;
use crate::types::Packet;
use crate::{Result, TelemetryError};

/// Sort packets by the onboard-time field.
pub fn order_by_onboard_time(packets: Vec<Packet>) -> Result<Vec<Packet>> {
    order_by_field(packets, ONBOARD_TIME_FIELD)
}

/// Sort packets by the numeric value of `key_field`, stably.
///
/// The input is consumed and a new ordered sequence returned. Fails with
/// a missing-field error (naming the offending packet index) if any
/// packet was decoded without the key field.
pub fn order_by_field(packets: Vec<Packet>, key_field: &str) -> Result<Vec<Packet>> {
    let mut keyed = Vec::with_capacity(packets.len());
    for packet in packets {
        let key = packet
            .field(key_field)
            .ok_or_else(|| TelemetryError::MissingField {
                field: key_field.to_string(),
                index: packet.index,
            })?
            .as_f64();
        keyed.push((key, packet));
    }
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, packet)| packet).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::PacketStream;
    use crate::test_utils::{mini_frame, mini_mission};
    use proptest::prelude::*;

    fn decode(obts: &[u32]) -> Vec<Packet> {
        let mut buffer = Vec::new();
        for &obt in obts {
            buffer.extend_from_slice(&mini_frame(obt, 0));
        }
        PacketStream::new(buffer, mini_mission()).decode_all().unwrap()
    }

    #[test]
    fn orders_by_onboard_time() {
        let ordered = order_by_onboard_time(decode(&[300, 100, 200])).unwrap();
        let obts: Vec<f64> = ordered.iter().filter_map(|p| p.f64("OBT")).collect();
        assert_eq!(obts, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        // Onboard times [100, 50, 50]: the two 50s must keep their
        // relative order (indices 1 then 2) ahead of index 0.
        let ordered = order_by_onboard_time(decode(&[100, 50, 50])).unwrap();
        let positions: Vec<(usize, f64)> =
            ordered.iter().map(|p| (p.index, p.f64("OBT").unwrap())).collect();
        assert_eq!(positions, vec![(1, 50.0), (2, 50.0), (0, 100.0)]);
    }

    #[test]
    fn missing_key_field_is_fatal() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&mini_frame(1, 0));
        let packets = PacketStream::new(buffer, mini_mission())
            .with_requested_fields(["seq"])
            .decode_all()
            .unwrap();

        let err = order_by_onboard_time(packets).unwrap_err();
        assert!(matches!(err, TelemetryError::MissingField { index: 0, .. }));
    }

    #[test]
    fn empty_collection_is_fine() {
        assert!(order_by_onboard_time(Vec::new()).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_output_sorted_and_stable(obts in prop::collection::vec(0u32..8, 0..32)) {
            let ordered = order_by_onboard_time(decode(&obts)).unwrap();

            for pair in ordered.windows(2) {
                let a = pair[0].f64("OBT").unwrap();
                let b = pair[1].f64("OBT").unwrap();
                prop_assert!(a <= b);
                // Stability: equal keys must preserve input order.
                if a == b {
                    prop_assert!(pair[0].index < pair[1].index);
                }
            }
            prop_assert_eq!(ordered.len(), obts.len());
        }
    }
}
