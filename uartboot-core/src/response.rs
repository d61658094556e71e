// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! ACK/NACK replies.

use heapless::Vec;

use crate::protocol::{AckStatus, ACK, MAX_REPLY_LEN, NACK};
use crate::transport::Transport;

pub type Reply = Vec<u8, MAX_REPLY_LEN>;

/// The single reply a packet gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Nack,
    /// ACK followed by the command payload; the declared reply length is the
    /// payload length.
    Ack(Reply),
}

impl Response {
    /// ACK carrying `payload`, or `None` if it does not fit a reply.
    pub fn try_ack(payload: &[u8]) -> Option<Self> {
        Reply::from_slice(payload).ok().map(Response::Ack)
    }

    /// Handlers only reply with a few bytes.
    ///
    /// # Panics
    /// If `payload` is longer than [`MAX_REPLY_LEN`].
    pub(crate) fn ack(payload: &[u8]) -> Self {
        Self::try_ack(payload)
            .unwrap_or_else(|| panic!("reply payload longer than {} bytes", MAX_REPLY_LEN))
    }

    pub fn status(status: AckStatus) -> Self {
        Self::ack(&[status.as_byte()])
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            Response::Nack => &[],
            Response::Ack(reply) => reply,
        }
    }

    /// Transmit the reply.
    pub fn emit<T: Transport>(&self, transport: &mut T) {
        match self {
            Response::Nack => send_nack(transport),
            Response::Ack(reply) => {
                let reply_len = u8::try_from(reply.len())
                    .unwrap_or_else(|_| unreachable!("reply capacity always fits in u8"));
                send_ack(transport, reply_len);
                if !reply.is_empty() {
                    transport.transmit(reply);
                }
            }
        }
    }
}

/// Send `{ACK, reply_len}`; the caller transmits `reply_len` bytes next.
pub fn send_ack<T: Transport>(transport: &mut T, reply_len: u8) {
    transport.transmit(&[ACK, reply_len]);
}

pub fn send_nack<T: Transport>(transport: &mut T) {
    transport.transmit(&[NACK]);
}
