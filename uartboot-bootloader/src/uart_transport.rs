// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Blocking UART transport.

use rp2040_hal::pac;
use rp2040_hal::uart::ReadErrorType;
use uartboot_core::transport::Transport;

use crate::board::Uart;

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ReceiveError {
    Overrun,
    Break,
    Parity,
    Framing,
}

impl From<ReadErrorType> for ReceiveError {
    fn from(e: ReadErrorType) -> Self {
        match e {
            ReadErrorType::Overrun => ReceiveError::Overrun,
            ReadErrorType::Break => ReceiveError::Break,
            ReadErrorType::Parity => ReceiveError::Parity,
            ReadErrorType::Framing => ReceiveError::Framing,
        }
    }
}

pub struct UartTransport {
    uart: Uart,
}

impl UartTransport {
    pub fn new(uart: Uart) -> Self {
        Self { uart }
    }

    /// Block until the transmit FIFO and shift register are empty.
    pub fn flush(&self) {
        // SAFETY: read-only access to the flag register of the UART we own.
        let regs = unsafe { &*pac::UART0::ptr() };
        while regs.uartfr().read().busy().bit_is_set() {
            cortex_m::asm::nop();
        }
    }
}

impl Transport for UartTransport {
    type Error = ReceiveError;

    fn transmit(&mut self, bytes: &[u8]) {
        self.uart.write_full_blocking(bytes);
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.uart.read_full_blocking(buf).map_err(ReceiveError::from)
    }
}
