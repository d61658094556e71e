// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command interpreter and memory-safety layer for the uartboot serial
//! bootloader.
//!
//! The host sends length-prefixed, CRC-terminated packets; [`dispatch`]
//! checks each one, runs the command against the device peripherals and
//! returns the reply together with the follow-up [`Action`]. Peripherals are
//! reached only through the traits in this crate, so everything here runs on
//! the host with fakes as well as on the target.
//!
//! This crate supports both `no_std` (embedded) and `std` (host) environments:
//! - Default: `no_std`
//! - `std` feature: implements `std::error::Error`
//! - `defmt` feature: logging and `defmt::Format` derives

#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub mod crc;
pub mod dispatch;
pub mod error;
pub mod flash;
pub mod identity;
pub mod memory;
pub mod packet;
pub mod protocol;
pub mod response;
pub mod transport;

// Re-export commonly used types
pub use dispatch::{dispatch, serve_one, Action, Device, DeviceConfig, Dispatch};
pub use error::Error;
pub use memory::{EntryPoint, MemoryMap, Region, RegionKind, ValidAddress};
pub use protocol::{AckStatus, AddressCheck, Opcode, ACK, MASS_ERASE, MAX_PACKET_LEN, NACK};
pub use response::Response;
