// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Memory regions, address validation and the memory write executor.

use crate::error::Error;
use crate::flash::{FlashController, Unlocked};
use crate::protocol::{MASS_ERASE, MAX_WRITE_LEN};

/// How bytes reach a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegionKind {
    /// Written through the flash controller.
    Flash,
    /// Stored directly.
    Ram,
}

/// A half-open address range `[start, start + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    pub start: u32,
    pub size: u32,
    pub kind: RegionKind,
}

impl Region {
    pub const fn new(start: u32, size: u32, kind: RegionKind) -> Self {
        Self { start, size, kind }
    }

    /// Last address inside the region.
    pub const fn last(&self) -> u32 {
        self.start + (self.size - 1)
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.start && address - self.start < self.size
    }

    /// True when `len` bytes starting at `address` stay inside the region.
    pub fn fits(&self, address: u32, len: usize) -> bool {
        if !self.contains(address) {
            return false;
        }
        let room = (self.size - (address - self.start)) as usize;
        len <= room
    }
}

/// Static memory layout of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryMap {
    pub flash: Region,
    pub sram: Region,
    pub sector_count: u8,
}

impl MemoryMap {
    /// STM32F4 with 1 MiB flash in 12 sectors and 128 KiB of SRAM.
    pub const STM32F4: MemoryMap = MemoryMap::new(0x0800_0000, 1024 * 1024, 12, 0x2000_0000, 128 * 1024);

    /// # Panics
    /// At compile time (in const contexts) if a region is empty, overlaps the
    /// other region, wraps the address space, or the sector count collides
    /// with the mass-erase sentinel.
    pub const fn new(
        flash_base: u32,
        flash_size: u32,
        sector_count: u8,
        sram_base: u32,
        sram_size: u32,
    ) -> Self {
        assert!(flash_size > 0 && sram_size > 0);
        assert!(sector_count > 0 && sector_count < MASS_ERASE);
        assert!(flash_base.checked_add(flash_size - 1).is_some());
        assert!(sram_base.checked_add(sram_size - 1).is_some());
        assert!(
            flash_base + (flash_size - 1) < sram_base || sram_base + (sram_size - 1) < flash_base
        );

        Self {
            flash: Region::new(flash_base, flash_size, RegionKind::Flash),
            sram: Region::new(sram_base, sram_size, RegionKind::Ram),
            sector_count,
        }
    }

    pub fn region_of(&self, address: u32) -> Option<&Region> {
        [&self.flash, &self.sram]
            .into_iter()
            .find(|region| region.contains(address))
    }

    /// Classify an address. Only flash and SRAM are ever valid.
    pub fn validate(&self, address: u32) -> Option<ValidAddress> {
        self.region_of(address).map(|region| ValidAddress {
            address,
            kind: region.kind,
        })
    }

    pub fn is_valid(&self, address: u32) -> bool {
        self.validate(address).is_some()
    }
}

/// An address that passed [`MemoryMap::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidAddress {
    address: u32,
    kind: RegionKind,
}

impl ValidAddress {
    pub fn get(&self) -> u32 {
        self.address
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }
}

/// A validated address the application may be started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EntryPoint(ValidAddress);

impl EntryPoint {
    pub fn new(address: ValidAddress) -> Self {
        Self(address)
    }

    pub fn address(&self) -> u32 {
        self.0.get()
    }

    /// Branch target with the low bit set to stay in Thumb state.
    pub fn thumb_address(&self) -> u32 {
        self.0.get() | 1
    }
}

/// Direct stores into SRAM.
pub trait RamStore {
    /// Copy `data` to `start`.
    ///
    /// Callers guarantee that `start .. start + data.len()` lies inside the
    /// SRAM region of the memory map.
    fn store(&mut self, start: ValidAddress, data: &[u8]);
}

/// Write `data` to a validated address.
///
/// Flash is programmed one byte at a time inside a single unlock scope and
/// stops at the first failing byte; bytes already programmed stay written.
/// SRAM is copied directly.
pub fn write<F: FlashController, R: RamStore>(
    flash: &mut F,
    ram: &mut R,
    map: &MemoryMap,
    target: ValidAddress,
    data: &[u8],
) -> Result<(), Error> {
    let region = match target.kind() {
        RegionKind::Flash => &map.flash,
        RegionKind::Ram => &map.sram,
    };

    if data.len() > MAX_WRITE_LEN || !region.fits(target.get(), data.len()) {
        warn!(
            "write: {} bytes at 0x{:08x} leave the region",
            data.len(),
            target.get()
        );
        return Err(Error::InvalidWriteParameters);
    }

    match target.kind() {
        RegionKind::Flash => {
            let mut unlocked = Unlocked::new(flash);
            for (offset, &byte) in data.iter().enumerate() {
                let address = target.get() + offset as u32;
                unlocked.program_byte(address, byte).map_err(|e| {
                    error!("write: programming 0x{:08x} failed: {}", address, e);
                    Error::FlashOperationFailed(e)
                })?;
            }
        }
        RegionKind::Ram => ram.store(target, data),
    }

    Ok(())
}
