// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use crate::frame::{GET_PREFIX, LIST_PREFIX, SET_PREFIX};

/// Subscribe to changes of every variable
pub const SUBSCRIBE_ALL: &str = "EN:*";

/// Frames sent to the PLC.
///
/// `Display` renders the frame text without the line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Request the full variable catalog
    List,
    /// Request the current value of one variable
    Get(String),
    /// Write a value; the PLC sends no reply
    Set { name: String, value: String },
    /// Subscribe to DIFF pushes for all variables
    SubscribeAll,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::List => f.write_str(LIST_PREFIX),
            Command::Get(name) => write!(f, "{GET_PREFIX}{name}"),
            Command::Set { name, value } => write!(f, "{SET_PREFIX}{name},{value}"),
            Command::SubscribeAll => f.write_str(SUBSCRIBE_ALL),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
