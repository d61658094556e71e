// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Frame parsing, command decoding and the host-side encoder.

use uartboot_core::crc;
use uartboot_core::packet::{encode, Command, Frame};
use uartboot_core::{Error, Opcode};

const GET_VERSION: [u8; 6] = [0x05, 0x51, 0xE7, 0xE9, 0xAB, 0x7C];

#[test]
fn test_encode_get_version_matches_wire_bytes() {
    let packet = encode(Opcode::GetVersion.as_byte(), &[]).unwrap();
    assert_eq!(packet.as_slice(), &GET_VERSION);
}

#[test]
fn test_frame_fields() {
    let packet = encode(0x57, &[0x00, 0x00, 0x00, 0x20, 0x02, 0xAB, 0xCD]).unwrap();
    let frame = Frame::parse(&packet).unwrap();

    assert_eq!(frame.wire_len(), 1 + 1 + 7 + 4);
    assert_eq!(frame.opcode(), 0x57);
    assert_eq!(frame.payload(), &[0x00, 0x00, 0x00, 0x20, 0x02, 0xAB, 0xCD]);
    assert_eq!(frame.covered(), &packet[..packet.len() - 4]);
    assert_eq!(frame.crc(), crc::checksum(frame.covered()));
}

#[test]
fn test_frame_crc_is_little_endian() {
    let frame = Frame::parse(&GET_VERSION).unwrap();
    assert_eq!(frame.crc(), 0x7CAB_E9E7);
}

#[test]
fn test_frame_rejects_empty_buffer() {
    assert_eq!(Frame::parse(&[]), Err(Error::FrameTooShort));
}

#[test]
fn test_frame_rejects_length_below_opcode_and_crc() {
    for following in 0..5u8 {
        let mut buf = vec![following];
        buf.extend(std::iter::repeat(0x51).take(following as usize));
        assert_eq!(Frame::parse(&buf), Err(Error::FrameTooShort), "length {following}");
    }
}

#[test]
fn test_frame_rejects_truncated_buffer() {
    assert_eq!(Frame::parse(&GET_VERSION[..5]), Err(Error::FrameTooShort));
}

#[test]
fn test_frame_ignores_trailing_bytes() {
    let mut buf = GET_VERSION.to_vec();
    buf.extend_from_slice(&[0xEE; 10]);

    let frame = Frame::parse(&buf).unwrap();
    assert_eq!(frame.wire_len(), GET_VERSION.len());
    assert_eq!(frame.crc(), 0x7CAB_E9E7);
}

fn decode(opcode: u8, payload: &[u8]) -> Result<Command<'static>, Error> {
    let packet = encode(opcode, payload).unwrap();
    let packet: &'static [u8] = Box::leak(packet.to_vec().into_boxed_slice());
    Command::decode(&Frame::parse(packet).unwrap())
}

#[test]
fn test_decode_fixed_commands() {
    assert_eq!(decode(0x51, &[]), Ok(Command::GetVersion));
    assert_eq!(decode(0x52, &[]), Ok(Command::GetHelp));
    assert_eq!(decode(0x53, &[]), Ok(Command::GetChipId));
    assert_eq!(decode(0x54, &[]), Ok(Command::GetRdpStatus));
}

#[test]
fn test_decode_go_to_address() {
    assert_eq!(
        decode(0x55, &[0x00, 0x40, 0x00, 0x08]),
        Ok(Command::GoToAddress {
            address: 0x0800_4000
        })
    );
}

#[test]
fn test_decode_flash_erase() {
    assert_eq!(
        decode(0x56, &[0x03, 0x02]),
        Ok(Command::FlashErase {
            sector: 3,
            count: 2
        })
    );
}

#[test]
fn test_decode_mem_write_keeps_declared_length() {
    let command = decode(0x57, &[0x10, 0x00, 0x00, 0x20, 0x05, 1, 2, 3]).unwrap();
    assert_eq!(
        command,
        Command::MemWrite {
            address: 0x2000_0010,
            length: 5,
            data: &[1, 2, 3],
        }
    );
}

#[test]
fn test_decode_short_payload_is_frame_error() {
    assert_eq!(decode(0x55, &[0x00, 0x40, 0x00]), Err(Error::FrameTooShort));
    assert_eq!(decode(0x56, &[0x03]), Err(Error::FrameTooShort));
    assert_eq!(decode(0x57, &[0x00, 0x00, 0x00, 0x20]), Err(Error::FrameTooShort));
}

#[test]
fn test_decode_open_commands_as_unimplemented() {
    for opcode in [0x58, 0x5A, 0x5B, 0x5C, 0x5D] {
        let expected = Opcode::try_from(opcode).unwrap();
        assert_eq!(decode(opcode, &[0x01]), Ok(Command::Unimplemented(expected)));
    }
}

#[test]
fn test_decode_unknown_opcode() {
    assert_eq!(decode(0x59, &[]), Err(Error::UnknownOpcode(0x59)));
    assert_eq!(decode(0x00, &[]), Err(Error::UnknownOpcode(0x00)));
}

#[test]
fn test_encode_rejects_oversized_payload() {
    assert!(encode(0x57, &[0u8; 250]).is_ok());
    assert!(encode(0x57, &[0u8; 251]).is_err());
}

#[test]
fn test_smallest_frame_is_opcode_and_crc() {
    let frame = Frame::parse(&GET_VERSION).unwrap();
    assert_eq!(frame.wire_len(), 6);
    assert!(frame.payload().is_empty());
    assert_eq!(frame.covered(), &[0x05, 0x51]);
}
