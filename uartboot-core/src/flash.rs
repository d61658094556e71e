// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash controller access and the erase executor.
//!
//! Erase and program sequences only run inside an [`Unlocked`] scope. The
//! guard unlocks the controller when it is created and locks it again when it
//! is dropped, whether the sequence finished or bailed out early with `?`.

use crate::error::Error;
use crate::protocol::{AckStatus, MASS_ERASE};

/// Failure reported by the flash peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    Error,
    Busy,
    Timeout,
    /// Program or erase requested while the controller was locked.
    Locked,
}

impl FlashError {
    pub fn ack_status(self) -> AckStatus {
        match self {
            FlashError::Error => AckStatus::FlashError,
            FlashError::Busy => AckStatus::FlashBusy,
            FlashError::Timeout => AckStatus::FlashTimeout,
            FlashError::Locked => AckStatus::FlashLocked,
        }
    }
}

/// What a single erase operation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EraseTarget {
    Mass,
    Sectors { first: u8, count: u8 },
}

/// Flash programming peripheral.
pub trait FlashController {
    fn unlock(&mut self);

    fn lock(&mut self);

    fn erase(&mut self, target: EraseTarget) -> Result<(), FlashError>;

    fn program_byte(&mut self, address: u32, value: u8) -> Result<(), FlashError>;
}

/// Exclusive unlocked access to the flash controller.
pub struct Unlocked<'a, F: FlashController> {
    flash: &'a mut F,
}

impl<'a, F: FlashController> Unlocked<'a, F> {
    pub fn new(flash: &'a mut F) -> Self {
        flash.unlock();
        Self { flash }
    }

    pub fn erase(&mut self, target: EraseTarget) -> Result<(), FlashError> {
        self.flash.erase(target)
    }

    pub fn program_byte(&mut self, address: u32, value: u8) -> Result<(), FlashError> {
        self.flash.program_byte(address, value)
    }
}

impl<F: FlashController> Drop for Unlocked<'_, F> {
    fn drop(&mut self) {
        self.flash.lock();
    }
}

/// Turn a host erase request into an erase target.
///
/// Mass erase ignores `count`. Otherwise the start sector must exist and the
/// count is clamped so the erase never runs past the last sector.
pub fn plan_erase(total_sectors: u8, sector: u8, count: u8) -> Result<EraseTarget, Error> {
    if sector == MASS_ERASE {
        return Ok(EraseTarget::Mass);
    }

    if sector >= total_sectors || count == 0 {
        return Err(Error::InvalidEraseParameters);
    }

    let count = count.min(total_sectors - sector);
    Ok(EraseTarget::Sectors {
        first: sector,
        count,
    })
}

/// Erase the sectors described by a host request.
pub fn erase<F: FlashController>(
    flash: &mut F,
    total_sectors: u8,
    sector: u8,
    count: u8,
) -> Result<EraseTarget, Error> {
    let target = plan_erase(total_sectors, sector, count).inspect_err(|_| {
        warn!(
            "erase: rejected sector {} count {} ({} sectors)",
            sector,
            count,
            total_sectors
        );
    })?;

    debug!("erase: {}", target);
    let mut unlocked = Unlocked::new(flash);
    unlocked.erase(target).map_err(|e| {
        error!("erase: flash reported {}", e);
        Error::FlashOperationFailed(e)
    })?;

    Ok(target)
}
