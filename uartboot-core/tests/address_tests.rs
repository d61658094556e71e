// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Address validation against the memory map.

use uartboot_core::{EntryPoint, MemoryMap, RegionKind};

const MAP: MemoryMap = MemoryMap::STM32F4;
const FLASH_BASE: u32 = 0x0800_0000;
const FLASH_END: u32 = 0x080F_FFFF;
const SRAM_BASE: u32 = 0x2000_0000;
const SRAM_SIZE: u32 = 128 * 1024;

#[test]
fn test_flash_bounds_are_inclusive() {
    assert!(MAP.is_valid(FLASH_BASE));
    assert!(MAP.is_valid(FLASH_END));
    assert!(!MAP.is_valid(FLASH_BASE - 1));
    assert!(!MAP.is_valid(FLASH_END + 1));
    assert_eq!(MAP.flash.last(), FLASH_END);
}

#[test]
fn test_sram_is_first_128k() {
    assert!(MAP.is_valid(SRAM_BASE));
    assert!(MAP.is_valid(SRAM_BASE + SRAM_SIZE - 1));
    assert!(!MAP.is_valid(SRAM_BASE + SRAM_SIZE));
    assert!(!MAP.is_valid(SRAM_BASE - 1));
}

#[test]
fn test_peripheral_and_system_space_is_invalid() {
    for address in [
        0x0000_0000,
        0x1FFF_C000, // option bytes
        0x4002_3C00, // flash interface registers
        0x4002_0000, // GPIOA
        0xE000_ED08, // SCB VTOR
        0xE004_2000, // DBGMCU IDCODE
        0xFFFF_FFFF,
    ] {
        assert!(!MAP.is_valid(address), "0x{address:08x}");
    }
}

#[test]
fn test_classification_matches_ranges() {
    // Sweep a coarse grid across the whole address space.
    for step in 0..=0xFFFFu32 {
        let address = step << 16 | (step & 0xFF) * 0x101;
        let in_flash = (FLASH_BASE..=FLASH_END).contains(&address);
        let in_sram = (SRAM_BASE..SRAM_BASE + SRAM_SIZE).contains(&address);
        assert_eq!(MAP.is_valid(address), in_flash || in_sram, "0x{address:08x}");
    }
}

#[test]
fn test_validate_reports_region_kind() {
    assert_eq!(MAP.validate(0x0800_4000).unwrap().kind(), RegionKind::Flash);
    assert_eq!(MAP.validate(0x2000_1000).unwrap().kind(), RegionKind::Ram);
    assert_eq!(MAP.validate(0x2000_1000).unwrap().get(), 0x2000_1000);
    assert!(MAP.validate(0x4000_0000).is_none());
}

#[test]
fn test_region_fits() {
    assert!(MAP.sram.fits(SRAM_BASE, SRAM_SIZE as usize));
    assert!(MAP.sram.fits(SRAM_BASE + SRAM_SIZE - 4, 4));
    assert!(!MAP.sram.fits(SRAM_BASE + SRAM_SIZE - 4, 5));
    assert!(MAP.flash.fits(FLASH_END, 1));
    assert!(!MAP.flash.fits(FLASH_END, 2));
    assert!(!MAP.flash.fits(FLASH_END + 1, 0));
}

#[test]
fn test_entry_point_sets_thumb_bit() {
    let entry = EntryPoint::new(MAP.validate(0x0800_4000).unwrap());
    assert_eq!(entry.address(), 0x0800_4000);
    assert_eq!(entry.thumb_address(), 0x0800_4001);

    let already_odd = EntryPoint::new(MAP.validate(0x0800_4001).unwrap());
    assert_eq!(already_odd.thumb_address(), 0x0800_4001);
}

#[test]
fn test_custom_map() {
    let map = MemoryMap::new(0x1000_0000, 2 * 1024 * 1024, 32, 0x2000_0000, 256 * 1024);
    assert!(map.is_valid(0x101F_FFFF));
    assert!(!map.is_valid(0x1020_0000));
    assert!(map.is_valid(0x2003_FFFF));
    assert!(!map.is_valid(0x2004_0000));
    assert_eq!(map.sector_count, 32);
}
