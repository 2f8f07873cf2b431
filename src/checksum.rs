//! 16-bit checksum engine for frame integrity validation.
//!
//! The engine is a parameterized CRC-16: a 16-bit register seeded with
//! `init`, each input byte (optionally bit-reflected) XORed into the high
//! byte followed by eight shift/conditional-XOR steps against `poly`, and
//! the final register optionally reflected and XORed with `xor_out`. The
//! profile used by the shipped mission is CRC-16/BUYPASS
//! (`poly=0x8005, init=0x0000`, no reflection, no final XOR).
//!
//! Computation is a pure function of the profile and input bytes.

use serde::{Deserialize, Serialize};

fn default_false() -> bool {
    false
}

/// CRC-16 parameterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumProfile {
    /// Generator polynomial (normal, MSB-first representation).
    pub poly: u16,
    /// Initial register value.
    #[serde(default)]
    pub init: u16,
    /// Bit-reflect each input byte before processing.
    #[serde(default = "default_false")]
    pub reflect_in: bool,
    /// Bit-reflect the final register value.
    #[serde(default = "default_false")]
    pub reflect_out: bool,
    /// Value XORed into the final register.
    #[serde(default)]
    pub xor_out: u16,
}

impl ChecksumProfile {
    /// CRC-16/BUYPASS: the profile used by the SAC-D downlink trailer.
    pub const BUYPASS: Self =
        Self { poly: 0x8005, init: 0x0000, reflect_in: false, reflect_out: false, xor_out: 0x0000 };

    /// CRC-16/IBM-3740 (also known as CCITT-FALSE), common in CCSDS
    /// transfer frames. Provided for alternate mission profiles.
    pub const IBM_3740: Self =
        Self { poly: 0x1021, init: 0xFFFF, reflect_in: false, reflect_out: false, xor_out: 0x0000 };

    /// Compute the checksum of `data` under this profile.
    pub fn compute(&self, data: &[u8]) -> u16 {
        let mut crc = self.init;
        for &byte in data {
            let byte = if self.reflect_in { byte.reverse_bits() } else { byte };
            crc ^= (byte as u16) << 8;
            for _ in 0..8 {
                crc = if crc & 0x8000 != 0 { (crc << 1) ^ self.poly } else { crc << 1 };
            }
        }
        if self.reflect_out {
            crc = crc.reverse_bits();
        }
        crc ^ self.xor_out
    }
}

impl Default for ChecksumProfile {
    fn default() -> Self {
        Self::BUYPASS
    }
}
