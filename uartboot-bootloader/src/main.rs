// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

#![no_std]
#![no_main]

mod board;
mod boot;
mod flash;
mod uart_transport;

include!(concat!(env!("OUT_DIR"), "/version.rs"));

use defmt_rtt as _;
use embedded_hal::digital::OutputPin;
use panic_probe as _;
use uartboot_core::crc::SoftCrc;
use uartboot_core::{serve_one, Action, Device, DeviceConfig, MemoryMap, MAX_PACKET_LEN};

use crate::boot::{SramStore, SysInfo};
use crate::flash::RomFlash;
use crate::uart_transport::UartTransport;

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

const MEMORY_MAP: MemoryMap = MemoryMap::new(
    flash::FLASH_BASE,
    flash::FLASH_SIZE,
    flash::SECTOR_COUNT,
    boot::SRAM_BASE,
    boot::SRAM_SIZE,
);

#[entry]
fn main() -> ! {
    defmt::println!("Bootloader init, version {}", BOOTLOADER_VERSION);

    let board::Board {
        uart,
        mut led,
        mut timer,
        sysinfo,
    } = match board::init() {
        Ok(board) => board,
        Err(e) => {
            defmt::println!("Board init failed: {}", e);
            park();
        }
    };
    board::blink(&mut led, &mut timer, 3, 200);

    let mut transport = UartTransport::new(uart);
    let mut device = Device {
        crc: SoftCrc::new(),
        flash: RomFlash::new(),
        ram: SramStore,
        identity: SysInfo::new(sysinfo),
        config: DeviceConfig {
            version: BOOTLOADER_VERSION,
            memory: MEMORY_MAP,
        },
    };
    let mut buf = [0u8; MAX_PACKET_LEN];

    defmt::println!("Waiting for commands on UART0");
    loop {
        let activity = |busy: bool| {
            if busy {
                led.set_high().ok();
            } else {
                led.set_low().ok();
            }
        };

        match serve_one(&mut transport, &mut device, &mut buf, activity) {
            Ok(Action::Continue) => {}
            Ok(Action::Jump(entry)) => {
                defmt::println!("Jumping to 0x{:08x}", entry.address());
                transport.flush();
                // SAFETY: the dispatcher only yields entry points inside flash or SRAM.
                unsafe { boot::transfer_control(entry) }
            }
            Err(e) => defmt::warn!("UART receive error: {}", e),
        }
    }
}

fn park() -> ! {
    loop {
        cortex_m::asm::nop();
    }
}
