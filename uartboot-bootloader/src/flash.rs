// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash controller over the RP2040 ROM routines.
//!
//! On RP2040, flash operations (erase/program) require disabling XIP first.
//! The full sequence is:
//!   1. connect_internal_flash()
//!   2. flash_exit_xip()
//!   3. flash_range_erase() or flash_range_program()
//!   4. flash_flush_cache()
//!   5. flash_enter_cmd_xip()
//!
//! All code executing during steps 1-5 must run from RAM, not flash.
//! We use `#[link_section = ".data"]` to place critical functions in RAM,
//! and pre-resolve all ROM function pointers when the controller is created.
//!
//! The part has no lock register. Unlocking only opens the software gate
//! checked before every erase and program.

use core::sync::atomic::{AtomicUsize, Ordering};
use uartboot_core::flash::{EraseTarget, FlashController, FlashError};

pub const FLASH_BASE: u32 = 0x1000_0000;
pub const FLASH_SIZE: u32 = 2 * 1024 * 1024;

/// Erase granularity exposed to the host as one "sector".
pub const BLOCK_SIZE: u32 = 64 * 1024;
pub const SECTOR_COUNT: u8 = (FLASH_SIZE / BLOCK_SIZE) as u8;

const PAGE_SIZE: usize = 256;
/// 64 KiB block erase.
const BLOCK_ERASE_CMD: u8 = 0xD8;

/// Blocks holding the bootloader image. The ROM routines return into this
/// code, so erasing or reprogramming it would crash the engine mid-command.
const PROTECTED_BLOCKS: u8 = 1;

// RP2040 ROM table addresses (defined in RP2040 datasheet section 2.8.3)
/// Pointer to the ROM function table (16-bit pointer stored at 0x14)
const ROM_FUNC_TABLE_PTR: *const u16 = 0x0000_0014 as *const u16;
/// Pointer to the ROM table lookup function (16-bit pointer stored at 0x18)
const ROM_TABLE_LOOKUP_PTR: *const u16 = 0x0000_0018 as *const u16;

type RomFnVoid = unsafe extern "C" fn();
type RomFnErase = unsafe extern "C" fn(u32, usize, u32, u8);
type RomFnProgram = unsafe extern "C" fn(u32, *const u8, usize);

static ROM_CONNECT_INTERNAL_FLASH: AtomicUsize = AtomicUsize::new(0);
static ROM_FLASH_EXIT_XIP: AtomicUsize = AtomicUsize::new(0);
static ROM_FLASH_RANGE_ERASE: AtomicUsize = AtomicUsize::new(0);
static ROM_FLASH_RANGE_PROGRAM: AtomicUsize = AtomicUsize::new(0);
static ROM_FLASH_FLUSH_CACHE: AtomicUsize = AtomicUsize::new(0);
static ROM_FLASH_ENTER_CMD_XIP: AtomicUsize = AtomicUsize::new(0);

/// Look up a ROM function by its two-character tag.
unsafe fn rom_func_lookup(tag: &[u8; 2]) -> usize {
    let fn_table = *ROM_FUNC_TABLE_PTR as *const u16;
    let lookup: unsafe extern "C" fn(*const u16, u32) -> usize =
        core::mem::transmute::<usize, unsafe extern "C" fn(*const u16, u32) -> usize>(
            *ROM_TABLE_LOOKUP_PTR as usize,
        );

    let code = u16::from_le_bytes(*tag) as u32;
    lookup(fn_table, code)
}

/// Resolve the ROM flash routines. Needs XIP to be active.
fn resolve_rom_functions() {
    unsafe {
        ROM_CONNECT_INTERNAL_FLASH.store(rom_func_lookup(b"IF"), Ordering::Release);
        ROM_FLASH_EXIT_XIP.store(rom_func_lookup(b"EX"), Ordering::Release);
        ROM_FLASH_RANGE_ERASE.store(rom_func_lookup(b"RE"), Ordering::Release);
        ROM_FLASH_RANGE_PROGRAM.store(rom_func_lookup(b"RP"), Ordering::Release);
        ROM_FLASH_FLUSH_CACHE.store(rom_func_lookup(b"FC"), Ordering::Release);
        ROM_FLASH_ENTER_CMD_XIP.store(rom_func_lookup(b"CX"), Ordering::Release);
    }
}

/// Erase `size` bytes of 64 KiB blocks at a flash-relative offset.
///
/// # Safety
/// The ROM functions must have been resolved, and the range must not hold
/// code that runs after this call.
#[link_section = ".data"]
#[inline(never)]
unsafe fn flash_erase(offset: u32, size: u32) {
    let connect: RomFnVoid = core::mem::transmute(ROM_CONNECT_INTERNAL_FLASH.load(Ordering::Acquire));
    let exit_xip: RomFnVoid = core::mem::transmute(ROM_FLASH_EXIT_XIP.load(Ordering::Acquire));
    let erase: RomFnErase = core::mem::transmute(ROM_FLASH_RANGE_ERASE.load(Ordering::Acquire));
    let flush: RomFnVoid = core::mem::transmute(ROM_FLASH_FLUSH_CACHE.load(Ordering::Acquire));
    let enter_xip: RomFnVoid = core::mem::transmute(ROM_FLASH_ENTER_CMD_XIP.load(Ordering::Acquire));

    cortex_m::interrupt::disable();
    connect();
    exit_xip();
    erase(offset, size as usize, BLOCK_SIZE, BLOCK_ERASE_CMD);
    flush();
    enter_xip();
    cortex_m::interrupt::enable();
}

/// Program whole pages at a flash-relative offset.
///
/// # Safety
/// Same as [`flash_erase`]; `data` must be valid for `len` bytes.
#[link_section = ".data"]
#[inline(never)]
unsafe fn flash_program(offset: u32, data: *const u8, len: usize) {
    let connect: RomFnVoid = core::mem::transmute(ROM_CONNECT_INTERNAL_FLASH.load(Ordering::Acquire));
    let exit_xip: RomFnVoid = core::mem::transmute(ROM_FLASH_EXIT_XIP.load(Ordering::Acquire));
    let program: RomFnProgram = core::mem::transmute(ROM_FLASH_RANGE_PROGRAM.load(Ordering::Acquire));
    let flush: RomFnVoid = core::mem::transmute(ROM_FLASH_FLUSH_CACHE.load(Ordering::Acquire));
    let enter_xip: RomFnVoid = core::mem::transmute(ROM_FLASH_ENTER_CMD_XIP.load(Ordering::Acquire));

    cortex_m::interrupt::disable();
    connect();
    exit_xip();
    program(offset, data, len);
    flush();
    enter_xip();
    cortex_m::interrupt::enable();
}

fn read_volatile_u8(addr: u32) -> u8 {
    unsafe { (addr as *const u8).read_volatile() }
}

/// Flash-relative offset of an absolute XIP address outside the protected
/// blocks.
fn writable_offset(address: u32) -> Option<u32> {
    let offset = address.checked_sub(FLASH_BASE)?;
    let protected = u32::from(PROTECTED_BLOCKS) * BLOCK_SIZE;
    (protected..FLASH_SIZE).contains(&offset).then_some(offset)
}

pub struct RomFlash {
    unlocked: bool,
}

impl RomFlash {
    pub fn new() -> Self {
        resolve_rom_functions();
        Self { unlocked: false }
    }
}

impl FlashController for RomFlash {
    fn unlock(&mut self) {
        self.unlocked = true;
    }

    fn lock(&mut self) {
        self.unlocked = false;
    }

    fn erase(&mut self, target: EraseTarget) -> Result<(), FlashError> {
        if !self.unlocked {
            return Err(FlashError::Locked);
        }

        let (first, count) = match target {
            EraseTarget::Mass => (PROTECTED_BLOCKS, SECTOR_COUNT - PROTECTED_BLOCKS),
            EraseTarget::Sectors { first, count } => (first, count),
        };
        let end = u16::from(first) + u16::from(count);
        if first < PROTECTED_BLOCKS || end > u16::from(SECTOR_COUNT) {
            defmt::warn!("flash: refusing to erase blocks {}..+{}", first, count);
            return Err(FlashError::Error);
        }

        defmt::debug!("flash: erasing blocks {}..+{}", first, count);
        // SAFETY: resolved in `new`; the range starts after the bootloader image.
        unsafe {
            flash_erase(
                u32::from(first) * BLOCK_SIZE,
                u32::from(count) * BLOCK_SIZE,
            )
        };
        Ok(())
    }

    fn program_byte(&mut self, address: u32, value: u8) -> Result<(), FlashError> {
        if !self.unlocked {
            return Err(FlashError::Locked);
        }
        let Some(offset) = writable_offset(address) else {
            defmt::warn!("flash: 0x{:08x} is not writable", address);
            return Err(FlashError::Error);
        };

        // NOR programming only clears bits, so the 0xFF filler leaves the
        // rest of the page as it was.
        let page_offset = offset & !(PAGE_SIZE as u32 - 1);
        let mut page = [0xFFu8; PAGE_SIZE];
        page[(offset - page_offset) as usize] = value;

        // SAFETY: resolved in `new`; the page lies outside the bootloader image.
        unsafe { flash_program(page_offset, page.as_ptr(), page.len()) };

        if read_volatile_u8(address) != value {
            defmt::warn!("flash: verify failed at 0x{:08x}", address);
            return Err(FlashError::Error);
        }
        Ok(())
    }
}
