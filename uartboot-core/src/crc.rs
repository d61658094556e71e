// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Packet CRC.
//!
//! The checksum is CRC-32/MPEG-2 (poly 0x04C11DB7, init 0xFFFFFFFF, no
//! reflection, no final XOR) computed over one 32-bit word per packet byte,
//! each byte zero-extended and fed most-significant byte first. That is what
//! a word-oriented hardware CRC unit produces when packet bytes are pushed
//! into it one at a time, and what the host tool computes.

use ::crc::{Crc, Digest, CRC_32_MPEG_2};

static CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// A word-oriented CRC accumulator, usually a hardware peripheral.
pub trait CrcUnit {
    /// Feed one 32-bit word and return the running checksum.
    fn accumulate(&mut self, word: u32) -> u32;

    /// Return the accumulator to its seed value.
    fn reset(&mut self);
}

/// Software CRC unit for parts without a compatible CRC peripheral.
#[derive(Clone)]
pub struct SoftCrc {
    digest: Digest<'static, u32>,
}

impl SoftCrc {
    pub fn new() -> Self {
        Self {
            digest: CRC32.digest(),
        }
    }
}

impl Default for SoftCrc {
    fn default() -> Self {
        Self::new()
    }
}

impl CrcUnit for SoftCrc {
    fn accumulate(&mut self, word: u32) -> u32 {
        self.digest.update(&word.to_be_bytes());
        self.digest.clone().finalize()
    }

    fn reset(&mut self) {
        self.digest = CRC32.digest();
    }
}

/// Check `data` against the CRC the host appended.
///
/// The unit is reset afterwards so consecutive calls are independent.
pub fn verify<C: CrcUnit>(unit: &mut C, data: &[u8], expected: u32) -> bool {
    let mut computed = 0;
    for &byte in data {
        computed = unit.accumulate(u32::from(byte));
    }
    unit.reset();

    if computed != expected {
        trace!("CRC mismatch: expected 0x{:08x}, got 0x{:08x}", expected, computed);
        return false;
    }
    true
}

/// Compute the packet CRC in software, as the host tool does.
pub fn checksum(data: &[u8]) -> u32 {
    let mut digest = CRC32.digest();
    for &byte in data {
        digest.update(&u32::from(byte).to_be_bytes());
    }
    digest.finalize()
}
