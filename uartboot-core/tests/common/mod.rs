// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! In-memory stand-ins for the device peripherals.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};

use uartboot_core::crc::SoftCrc;
use uartboot_core::flash::{EraseTarget, FlashController, FlashError};
use uartboot_core::identity::DeviceIdentity;
use uartboot_core::memory::RamStore;
use uartboot_core::transport::Transport;
use uartboot_core::{Device, DeviceConfig, MemoryMap, ValidAddress};

pub const VERSION: u8 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOp {
    Unlock,
    Lock,
    Erase(EraseTarget),
    Program(u32, u8),
}

/// Flash controller that records every call and tracks its lock state.
#[derive(Default)]
pub struct FakeFlash {
    pub ops: Vec<FlashOp>,
    pub unlocked: bool,
    pub cells: BTreeMap<u32, u8>,
    pub fail_program_at: Option<u32>,
    pub fail_erase_with: Option<FlashError>,
}

impl FakeFlash {
    pub fn erases(&self) -> Vec<EraseTarget> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                FlashOp::Erase(target) => Some(*target),
                _ => None,
            })
            .collect()
    }

    pub fn programmed(&self) -> Vec<(u32, u8)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                FlashOp::Program(addr, value) => Some((*addr, *value)),
                _ => None,
            })
            .collect()
    }

    pub fn touched(&self) -> bool {
        !self.ops.is_empty()
    }
}

impl FlashController for FakeFlash {
    fn unlock(&mut self) {
        self.ops.push(FlashOp::Unlock);
        self.unlocked = true;
    }

    fn lock(&mut self) {
        self.ops.push(FlashOp::Lock);
        self.unlocked = false;
    }

    fn erase(&mut self, target: EraseTarget) -> Result<(), FlashError> {
        if !self.unlocked {
            return Err(FlashError::Locked);
        }
        self.ops.push(FlashOp::Erase(target));
        match self.fail_erase_with {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn program_byte(&mut self, address: u32, value: u8) -> Result<(), FlashError> {
        if !self.unlocked {
            return Err(FlashError::Locked);
        }
        if self.fail_program_at == Some(address) {
            return Err(FlashError::Error);
        }
        self.ops.push(FlashOp::Program(address, value));
        self.cells.insert(address, value);
        Ok(())
    }
}

/// Byte-addressable SRAM image.
pub struct FakeRam {
    pub base: u32,
    pub bytes: Vec<u8>,
    pub stores: usize,
}

impl FakeRam {
    pub fn new(base: u32, size: u32) -> Self {
        Self {
            base,
            bytes: vec![0; size as usize],
            stores: 0,
        }
    }

    pub fn read(&self, address: u32, len: usize) -> &[u8] {
        let start = (address - self.base) as usize;
        &self.bytes[start..start + len]
    }
}

impl RamStore for FakeRam {
    fn store(&mut self, start: ValidAddress, data: &[u8]) {
        let offset = (start.get() - self.base) as usize;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self.stores += 1;
    }
}

pub struct FakeIdentity {
    pub device_id: u32,
    pub option_bytes: u32,
}

impl DeviceIdentity for FakeIdentity {
    fn device_id_register(&self) -> u32 {
        self.device_id
    }

    fn option_bytes_register(&self) -> u32 {
        self.option_bytes
    }
}

/// Transport fed from a byte script, recording everything transmitted.
#[derive(Default)]
pub struct ScriptedTransport {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Exhausted;

impl ScriptedTransport {
    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            rx: bytes.iter().copied().collect(),
            tx: Vec::new(),
        }
    }
}

impl Transport for ScriptedTransport {
    type Error = Exhausted;

    fn transmit(&mut self, bytes: &[u8]) {
        self.tx.extend_from_slice(bytes);
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        if self.rx.len() < buf.len() {
            return Err(Exhausted);
        }
        for slot in buf.iter_mut() {
            *slot = self.rx.pop_front().ok_or(Exhausted)?;
        }
        Ok(())
    }
}

pub type TestDevice = Device<SoftCrc, FakeFlash, FakeRam, FakeIdentity>;

/// STM32F4 layout: 1 MiB flash in 12 sectors, 128 KiB SRAM.
pub fn device() -> TestDevice {
    let memory = MemoryMap::STM32F4;
    Device {
        crc: SoftCrc::new(),
        flash: FakeFlash::default(),
        ram: FakeRam::new(memory.sram.start, memory.sram.size),
        identity: FakeIdentity {
            device_id: 0x1000_6413,
            option_bytes: 0x0FFF_AAED,
        },
        config: DeviceConfig {
            version: VERSION,
            memory,
        },
    }
}
