// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command dispatcher.
//!
//! Each packet goes through the same steps: frame check, CRC gate, decode,
//! handler. Nothing is carried from one packet to the next, so the host may
//! resend any command on its own. Frame and CRC failures become a NACK
//! before any handler runs; handler failures are reported as a status byte
//! inside an ACK.

use crate::crc::{self, CrcUnit};
use crate::error::Error;
use crate::flash::{self, FlashController};
use crate::identity::{self, DeviceIdentity};
use crate::memory::{self, EntryPoint, MemoryMap, RamStore};
use crate::packet::{Command, Frame};
use crate::protocol::{AckStatus, AddressCheck, Opcode, MAX_PACKET_LEN, MAX_WRITE_LEN};
use crate::response::Response;
use crate::transport::{self, Transport};

/// Static device parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Reported by get-version.
    pub version: u8,
    pub memory: MemoryMap,
}

/// Owned peripheral handles the dispatcher works through.
pub struct Device<C, F, R, I> {
    pub crc: C,
    pub flash: F,
    pub ram: R,
    pub identity: I,
    pub config: DeviceConfig,
}

/// What the caller does once the response is out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Wait for the next packet.
    Continue,
    /// Hand control to the application. Never returns.
    Jump(EntryPoint),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub response: Response,
    pub action: Action,
}

impl Dispatch {
    fn reply(response: Response) -> Self {
        Self {
            response,
            action: Action::Continue,
        }
    }

    fn nack() -> Self {
        Self::reply(Response::Nack)
    }
}

/// Handle one packet.
pub fn dispatch<C, F, R, I>(packet: &[u8], device: &mut Device<C, F, R, I>) -> Dispatch
where
    C: CrcUnit,
    F: FlashController,
    R: RamStore,
    I: DeviceIdentity,
{
    let frame = match Frame::parse(packet) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("dispatch: rejected frame of {} bytes: {}", packet.len(), e);
            return Dispatch::nack();
        }
    };

    if !crc::verify(&mut device.crc, frame.covered(), frame.crc()) {
        warn!("dispatch: CRC mismatch on opcode 0x{:02x}", frame.opcode());
        return Dispatch::nack();
    }

    let command = match Command::decode(&frame) {
        Ok(command) => command,
        Err(e) => {
            warn!("dispatch: cannot decode opcode 0x{:02x}: {}", frame.opcode(), e);
            return Dispatch::nack();
        }
    };

    debug!("dispatch: opcode 0x{:02x}", frame.opcode());
    execute(command, device)
}

fn execute<C, F, R, I>(command: Command<'_>, device: &mut Device<C, F, R, I>) -> Dispatch
where
    F: FlashController,
    R: RamStore,
    I: DeviceIdentity,
{
    match command {
        Command::GetVersion => Dispatch::reply(Response::ack(&[device.config.version])),
        Command::GetHelp => handle_get_help(),
        Command::GetChipId => {
            let id = identity::chip_id(&device.identity);
            Dispatch::reply(Response::ack(&id.to_le_bytes()))
        }
        Command::GetRdpStatus => {
            Dispatch::reply(Response::ack(&[identity::rdp_level(&device.identity)]))
        }
        Command::GoToAddress { address } => handle_go_to_address(&device.config.memory, address),
        Command::FlashErase { sector, count } => {
            let result = flash::erase(
                &mut device.flash,
                device.config.memory.sector_count,
                sector,
                count,
            );
            status_reply(result.map(|_| ()))
        }
        Command::MemWrite {
            address,
            length,
            data,
        } => status_reply(handle_mem_write(device, address, length, data)),
        Command::Unimplemented(opcode) => {
            warn!("dispatch: {} has no implementation", opcode);
            status_reply(Err(Error::UnimplementedCommand(opcode)))
        }
    }
}

fn status_reply(result: Result<(), Error>) -> Dispatch {
    let status = match result {
        Ok(()) => AckStatus::Ok,
        Err(e) => e.ack_status().unwrap_or(AckStatus::FlashError),
    };
    Dispatch::reply(Response::status(status))
}

fn handle_get_help() -> Dispatch {
    let mut opcodes = [0u8; Opcode::ALL.len()];
    for (slot, opcode) in opcodes.iter_mut().zip(Opcode::ALL) {
        *slot = opcode.as_byte();
    }
    Dispatch::reply(Response::ack(&opcodes))
}

fn handle_go_to_address(map: &MemoryMap, address: u32) -> Dispatch {
    let Some(valid) = map.validate(address) else {
        warn!("go-to-address: 0x{:08x} is not in flash or SRAM", address);
        return Dispatch::reply(Response::ack(&[AddressCheck::Invalid.as_byte()]));
    };

    let entry = EntryPoint::new(valid);
    debug!("go-to-address: jumping to 0x{:08x}", entry.thumb_address());
    Dispatch {
        response: Response::ack(&[AddressCheck::Valid.as_byte()]),
        action: Action::Jump(entry),
    }
}

fn handle_mem_write<C, F, R, I>(
    device: &mut Device<C, F, R, I>,
    address: u32,
    length: u8,
    data: &[u8],
) -> Result<(), Error>
where
    F: FlashController,
    R: RamStore,
{
    let length = usize::from(length);
    if length > MAX_WRITE_LEN || length > data.len() {
        warn!(
            "mem-write: declared {} bytes, frame carries {}",
            length,
            data.len()
        );
        return Err(Error::InvalidWriteParameters);
    }

    let target = device
        .config
        .memory
        .validate(address)
        .ok_or(Error::InvalidAddress)?;

    memory::write(
        &mut device.flash,
        &mut device.ram,
        &device.config.memory,
        target,
        &data[..length],
    )
}

/// Receive one packet, dispatch it and send the response.
///
/// `activity` is called with `true` once a packet has arrived and with
/// `false` after its response is out, so boards can drive a busy LED. It is
/// not called when the receive fails.
pub fn serve_one<T, C, F, R, I, A>(
    transport: &mut T,
    device: &mut Device<C, F, R, I>,
    buf: &mut [u8; MAX_PACKET_LEN],
    mut activity: A,
) -> Result<Action, T::Error>
where
    T: Transport,
    C: CrcUnit,
    F: FlashController,
    R: RamStore,
    I: DeviceIdentity,
    A: FnMut(bool),
{
    let packet = transport::read_packet(transport, buf)?;
    activity(true);
    let outcome = dispatch(packet, device);
    outcome.response.emit(transport);
    activity(false);
    Ok(outcome.action)
}
