// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PLCComS wire protocol.
//!
//! Wire format: one Windows-1250 text frame per line, `\n` terminated.
//! Outbound frames are [`Command`]s; inbound frames are parsed by the
//! functions in [`frame`].

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod command;
pub mod frame;

pub use codec::{decode_line, encode_line, read_line, write_line, ProtocolError};
pub use command::{Command, SUBSCRIBE_ALL};
pub use frame::{parse_diff, parse_get_reply, parse_list_line, Diff, GetReply, ListLine};
pub use frame::{DIFF_PREFIX, GET_PREFIX, LIST_PREFIX, SET_PREFIX};
