//! Shared fixtures for unit tests: a tiny 8-byte mission profile and a
//! frame builder with a correct checksum trailer.

use std::sync::Arc;

use crate::catalog::{FieldCatalog, FieldEncoding, FieldSpec};
use crate::checksum::ChecksumProfile;
use crate::layout::FrameLayout;
use crate::mission::{ByteOrder, ChecksumSpec, MissionProfile};

/// 8-byte frame: HDR(2) | BODY(4) | CRC(2), fields `seq`, `OBT`, `CRC`,
/// big-endian BUYPASS trailer over bytes 0..6.
pub fn mini_mission() -> Arc<MissionProfile> {
    let layout = FrameLayout::new([("HDR", 2usize), ("BODY", 4), ("CRC", 2)]).unwrap();
    let catalog = FieldCatalog::new(
        [
            FieldSpec {
                name: "seq".into(),
                section: "HDR".into(),
                bit_offset: 0,
                bit_width: 16,
                encoding: FieldEncoding::UnsignedInt,
                scale: 1.0,
                offset: 0.0,
                unit: String::new(),
            },
            FieldSpec {
                name: "OBT".into(),
                section: "BODY".into(),
                bit_offset: 0,
                bit_width: 32,
                encoding: FieldEncoding::UnsignedInt,
                scale: 1.0,
                offset: 0.0,
                unit: "GPS s".into(),
            },
            FieldSpec {
                name: "CRC".into(),
                section: "CRC".into(),
                bit_offset: 0,
                bit_width: 16,
                encoding: FieldEncoding::UnsignedInt,
                scale: 1.0,
                offset: 0.0,
                unit: String::new(),
            },
        ],
        &layout,
    )
    .unwrap();

    let checksum = ChecksumSpec {
        field: "CRC".into(),
        byte_order: ByteOrder::Big,
        profile: ChecksumProfile::BUYPASS,
        coverage: None,
    };

    Arc::new(MissionProfile::new("mini", layout, catalog, Some(checksum)).unwrap())
}

/// Build one valid mini-mission frame.
pub fn mini_frame(obt: u32, seq: u16) -> Vec<u8> {
    let mut frame = vec![0u8; 8];
    frame[0..2].copy_from_slice(&seq.to_be_bytes());
    frame[2..6].copy_from_slice(&obt.to_be_bytes());
    let crc = ChecksumProfile::BUYPASS.compute(&frame[..6]);
    frame[6..8].copy_from_slice(&crc.to_be_bytes());
    frame
}
