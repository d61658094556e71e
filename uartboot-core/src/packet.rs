// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Packet framing and command decoding.
//!
//! ```text
//! byte 0       : N, number of bytes that follow
//! byte 1       : opcode
//! bytes 2..N-4 : command payload
//! bytes N-3..N : CRC-32, little-endian, over bytes 0..N-4
//! ```

use heapless::Vec;

use crate::crc;
use crate::error::Error;
use crate::protocol::{Opcode, CRC_LEN, MAX_PACKET_LEN, MIN_FOLLOWING_LEN};

/// Owned packet bytes, as built by a host or buffered by a receiver.
pub type Packet = Vec<u8, MAX_PACKET_LEN>;

/// A length-checked view over one received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Check the length byte against the buffer.
    ///
    /// Bytes after the declared length are ignored.
    pub fn parse(buf: &'a [u8]) -> Result<Self, Error> {
        let following = *buf.first().ok_or(Error::FrameTooShort)?;
        if following < MIN_FOLLOWING_LEN {
            return Err(Error::FrameTooShort);
        }

        let total = usize::from(following) + 1;
        let bytes = buf.get(..total).ok_or(Error::FrameTooShort)?;
        Ok(Self { bytes })
    }

    /// Total frame size, length byte included.
    pub fn wire_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn opcode(&self) -> u8 {
        self.bytes[1]
    }

    /// Bytes between the opcode and the CRC.
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[2..self.crc_offset()]
    }

    /// Bytes covered by the CRC.
    pub fn covered(&self) -> &'a [u8] {
        &self.bytes[..self.crc_offset()]
    }

    pub fn crc(&self) -> u32 {
        let mut raw = [0u8; CRC_LEN];
        raw.copy_from_slice(&self.bytes[self.crc_offset()..]);
        u32::from_le_bytes(raw)
    }

    fn crc_offset(&self) -> usize {
        self.bytes.len() - CRC_LEN
    }
}

/// A decoded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    GetVersion,
    GetHelp,
    GetChipId,
    GetRdpStatus,
    GoToAddress {
        address: u32,
    },
    FlashErase {
        sector: u8,
        count: u8,
    },
    /// `data` is everything after the length field; `length` is what the
    /// host declared and is checked against it by the handler.
    MemWrite {
        address: u32,
        length: u8,
        data: &'a [u8],
    },
    /// In the command table, with no action behind it.
    Unimplemented(Opcode),
}

impl<'a> Command<'a> {
    pub fn decode(frame: &Frame<'a>) -> Result<Self, Error> {
        let opcode = Opcode::try_from(frame.opcode()).map_err(Error::UnknownOpcode)?;
        let mut payload = Reader::new(frame.payload());

        let command = match opcode {
            Opcode::GetVersion => Command::GetVersion,
            Opcode::GetHelp => Command::GetHelp,
            Opcode::GetChipId => Command::GetChipId,
            Opcode::GetRdpStatus => Command::GetRdpStatus,
            Opcode::GoToAddress => Command::GoToAddress {
                address: payload.u32()?,
            },
            Opcode::FlashErase => Command::FlashErase {
                sector: payload.u8()?,
                count: payload.u8()?,
            },
            Opcode::MemWrite => Command::MemWrite {
                address: payload.u32()?,
                length: payload.u8()?,
                data: payload.rest(),
            },
            Opcode::EnableRwProtect
            | Opcode::MemRead
            | Opcode::ReadSectorStatus
            | Opcode::OtpRead
            | Opcode::DisableWriteProtect => Command::Unimplemented(opcode),
        };

        Ok(command)
    }
}

/// Bounds-checked little-endian field reader.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let (head, tail) = self.buf.split_first_chunk::<N>().ok_or(Error::FrameTooShort)?;
        self.buf = tail;
        Ok(*head)
    }

    fn u8(&mut self) -> Result<u8, Error> {
        self.take::<1>().map(|[b]| b)
    }

    fn u32(&mut self) -> Result<u32, Error> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    fn rest(&mut self) -> &'a [u8] {
        core::mem::take(&mut self.buf)
    }
}

/// Build a packet the way the host tool does: length byte, opcode, payload
/// and the trailing CRC.
pub fn encode(opcode: u8, payload: &[u8]) -> Result<Packet, Error> {
    let following = 1 + payload.len() + CRC_LEN;
    let following = u8::try_from(following).map_err(|_| Error::InvalidWriteParameters)?;

    // Capacity is 256 and `following` fits in a u8, so none of these can fail.
    let mut packet = Packet::new();
    let _ = packet.push(following);
    let _ = packet.push(opcode);
    let _ = packet.extend_from_slice(payload);

    let crc = crc::checksum(&packet);
    let _ = packet.extend_from_slice(&crc.to_le_bytes());

    Ok(packet)
}
