// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

/// Read-only identification registers.
pub trait DeviceIdentity {
    /// Raw device-ID register.
    fn device_id_register(&self) -> u32;

    /// Raw option-byte word holding the read-protection level in bits 15:8.
    fn option_bytes_register(&self) -> u32;
}

/// Chip identifier: the low 12 bits of the device-ID register.
pub fn chip_id<I: DeviceIdentity + ?Sized>(identity: &I) -> u16 {
    (identity.device_id_register() & 0x0FFF) as u16
}

/// Read-protection level byte.
pub fn rdp_level<I: DeviceIdentity + ?Sized>(identity: &I) -> u8 {
    ((identity.option_bytes_register() >> 8) & 0xFF) as u8
}
