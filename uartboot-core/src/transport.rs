// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial link to the host.

use crate::protocol::MAX_PACKET_LEN;

/// A blocking, point-to-point byte link.
pub trait Transport {
    type Error;

    /// Send all of `bytes`, returning once the link has accepted them.
    fn transmit(&mut self, bytes: &[u8]);

    /// Fill `buf` completely.
    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// Receive one length-prefixed packet into `buf`.
///
/// Reads the length byte, then exactly that many bytes. Returns the filled
/// prefix of `buf`; content is not validated here.
pub fn read_packet<'b, T: Transport>(
    transport: &mut T,
    buf: &'b mut [u8; MAX_PACKET_LEN],
) -> Result<&'b [u8], T::Error> {
    transport.receive(&mut buf[..1])?;
    let total = usize::from(buf[0]) + 1;
    transport.receive(&mut buf[1..total])?;
    Ok(&buf[..total])
}
