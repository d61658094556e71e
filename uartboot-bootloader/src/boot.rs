// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

use rp2040_hal::pac;
use uartboot_core::identity::DeviceIdentity;
use uartboot_core::memory::RamStore;
use uartboot_core::{EntryPoint, ValidAddress};

/// Striped SRAM0-3 window open to host writes. The bootloader itself runs
/// from SRAM4/5 above it.
pub const SRAM_BASE: u32 = 0x2000_0000;
pub const SRAM_SIZE: u32 = 256 * 1024;

/// Reported by get-RDP-status: the RP2040 has no read protection.
const RDP_LEVEL_0: u8 = 0xAA;

/// Direct stores into the SRAM window.
pub struct SramStore;

impl RamStore for SramStore {
    fn store(&mut self, start: ValidAddress, data: &[u8]) {
        let base = start.get() as *mut u8;
        for (i, &byte) in data.iter().enumerate() {
            // SAFETY: `start` is validated as SRAM and the caller has checked
            // that `data` fits the region, which lies outside our own RAM.
            unsafe { base.add(i).write_volatile(byte) };
        }
    }
}

/// Device identity read from the SYSINFO block.
pub struct SysInfo {
    sysinfo: pac::SYSINFO,
}

impl SysInfo {
    pub fn new(sysinfo: pac::SYSINFO) -> Self {
        Self { sysinfo }
    }
}

impl DeviceIdentity for SysInfo {
    fn device_id_register(&self) -> u32 {
        self.sysinfo.chip_id().read().bits()
    }

    fn option_bytes_register(&self) -> u32 {
        u32::from(RDP_LEVEL_0) << 8
    }
}

/// Branch to a host-selected entry point.
///
/// Nothing is torn down first: peripherals, clocks, the stack pointer and
/// the vector table stay as the bootloader left them.
///
/// # Safety
/// The address must hold Thumb code the host has loaded for this purpose.
pub unsafe fn transfer_control(entry: EntryPoint) -> ! {
    core::arch::asm!(
        "bx {entry}",
        entry = in(reg) entry.thumb_address(),
        options(noreturn)
    );
}
