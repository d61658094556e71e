// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

use core::fmt;

use crate::flash::FlashError;
use crate::protocol::{AckStatus, Opcode};

/// Everything that can go wrong while handling one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Fewer bytes than the frame header, length byte or opcode fields require.
    FrameTooShort,
    /// The trailing CRC does not match the packet contents.
    CrcMismatch,
    /// The opcode is not in the command table.
    UnknownOpcode(u8),
    InvalidAddress,
    InvalidEraseParameters,
    InvalidWriteParameters,
    FlashOperationFailed(FlashError),
    UnimplementedCommand(Opcode),
}

impl Error {
    /// Frame errors are answered with a NACK; everything else is reported
    /// as a status byte inside an ACK.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Error::FrameTooShort | Error::CrcMismatch | Error::UnknownOpcode(_)
        )
    }

    /// Status byte for errors detected after the CRC gate.
    pub fn ack_status(&self) -> Option<AckStatus> {
        match self {
            Error::FrameTooShort | Error::CrcMismatch | Error::UnknownOpcode(_) => None,
            Error::InvalidAddress => Some(AckStatus::InvalidAddress),
            Error::InvalidEraseParameters => Some(AckStatus::InvalidSector),
            Error::InvalidWriteParameters => Some(AckStatus::InvalidLength),
            Error::FlashOperationFailed(e) => Some(e.ack_status()),
            Error::UnimplementedCommand(_) => Some(AckStatus::Unimplemented),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FrameTooShort => f.write_str("frame too short"),
            Error::CrcMismatch => f.write_str("CRC mismatch"),
            Error::UnknownOpcode(op) => write!(f, "unknown opcode 0x{op:02x}"),
            Error::InvalidAddress => f.write_str("address outside flash and SRAM"),
            Error::InvalidEraseParameters => f.write_str("invalid erase parameters"),
            Error::InvalidWriteParameters => f.write_str("invalid write parameters"),
            Error::FlashOperationFailed(e) => write!(f, "flash operation failed: {e:?}"),
            Error::UnimplementedCommand(op) => write!(f, "unimplemented command {op:?}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
