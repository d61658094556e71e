// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Protocol constants shared by the device and host tools.
//!
//! Every byte value here is part of the host contract and must stay stable.

// --- Framing ---

pub const ACK: u8 = 0xA5;
pub const NACK: u8 = 0x7F;

/// Largest packet on the wire: the length byte plus up to 255 bytes.
pub const MAX_PACKET_LEN: usize = u8::MAX as usize + 1;

/// Bytes following the length byte in the smallest valid packet (opcode + CRC).
pub const MIN_FOLLOWING_LEN: u8 = 1 + CRC_LEN as u8;

pub const CRC_LEN: usize = 4;

/// Largest ACK payload; the declared reply length is a single byte.
pub const MAX_REPLY_LEN: usize = u8::MAX as usize;

/// Sector number requesting a full-array erase.
pub const MASS_ERASE: u8 = 0xFF;

/// Largest mem-write payload: a full frame minus length, opcode, address,
/// length field and CRC.
pub const MAX_WRITE_LEN: usize = MAX_PACKET_LEN - 1 - 1 - 4 - 1 - CRC_LEN;

// --- Commands ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    GetVersion = 0x51,
    GetHelp = 0x52,
    GetChipId = 0x53,
    GetRdpStatus = 0x54,
    GoToAddress = 0x55,
    FlashErase = 0x56,
    MemWrite = 0x57,
    EnableRwProtect = 0x58,
    MemRead = 0x5A,
    ReadSectorStatus = 0x5B,
    OtpRead = 0x5C,
    DisableWriteProtect = 0x5D,
}

impl Opcode {
    /// Every supported opcode, in the order reported by get-help.
    pub const ALL: [Opcode; 12] = [
        Opcode::GetVersion,
        Opcode::GetHelp,
        Opcode::GetChipId,
        Opcode::GetRdpStatus,
        Opcode::GoToAddress,
        Opcode::FlashErase,
        Opcode::MemWrite,
        Opcode::EnableRwProtect,
        Opcode::MemRead,
        Opcode::ReadSectorStatus,
        Opcode::OtpRead,
        Opcode::DisableWriteProtect,
    ];

    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.as_byte() == byte)
            .ok_or(byte)
    }
}

// --- Replies ---

/// Status byte carried inside an ACK payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AckStatus {
    Ok = 0x00,
    FlashError = 0x01,
    FlashBusy = 0x02,
    FlashTimeout = 0x03,
    InvalidSector = 0x04,
    InvalidAddress = 0x05,
    InvalidLength = 0x06,
    Unimplemented = 0x07,
    FlashLocked = 0x08,
}

impl AckStatus {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Indicator byte returned by go-to-address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AddressCheck {
    Valid = 0x00,
    Invalid = 0x01,
}

impl AddressCheck {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}
