// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound frame parsing.
//!
//! The PLC sends three kinds of lines: catalog entries (`LIST:`), value
//! replies (`GET:` or bare `name,value`), and asynchronous pushes (`DIFF:`).

use crate::codec::ProtocolError;

pub const LIST_PREFIX: &str = "LIST:";
pub const GET_PREFIX: &str = "GET:";
pub const SET_PREFIX: &str = "SET:";
pub const DIFF_PREFIX: &str = "DIFF:";

/// Flags the PLC appends to catalog entries
const LIST_FLAGS: [char; 2] = ['*', '~'];

/// One line of a LIST response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListLine {
    /// A catalog entry with its flags stripped
    Entry(String),
    /// An entry whose name was empty after stripping; skip it
    Skip,
    /// The listing is over
    End,
}

/// Classify one line of a LIST response.
///
/// The listing ends at a bare `LIST:`, at an entry with an empty payload,
/// or at any line that does not start with `LIST:`.
pub fn parse_list_line(line: &str) -> ListLine {
    let Some(payload) = line.strip_prefix(LIST_PREFIX) else {
        return ListLine::End;
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return ListLine::End;
    }
    let name = payload.split(',').next().unwrap_or_default().trim();
    let name = name.trim_end_matches(LIST_FLAGS);
    if name.is_empty() {
        ListLine::Skip
    } else {
        ListLine::Entry(name.to_string())
    }
}

/// A parsed GET reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetReply {
    /// Variable name echoed by the PLC, if any
    pub name: Option<String>,
    /// Unquoted value; empty when the reply carried none
    pub value: String,
}

/// Parse a GET reply.
///
/// Accepts `GET:VAR,value`, `VAR,value` and `,value`. A leading `label:`
/// is stripped from the head, the value is trimmed and unquoted. A reply
/// without a comma has an empty value.
pub fn parse_get_reply(line: &str) -> GetReply {
    let (head, value) = match line.split_once(',') {
        Some((head, value)) => (head, unquote(value)),
        None => (line, String::new()),
    };
    GetReply { name: head_name(head), value }
}

fn head_name(head: &str) -> Option<String> {
    let head = head.trim();
    let name = match head.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => head,
    };
    (!name.is_empty()).then(|| name.to_string())
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').to_string()
}

/// An asynchronous value push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub name: String,
    /// Value with surrounding whitespace trimmed
    pub value: String,
}

/// Parse a `DIFF:<var>,<value>` push.
///
/// Returns [`ProtocolError::Malformed`] for lines without the prefix or
/// without a comma.
pub fn parse_diff(line: &str) -> Result<Diff, ProtocolError> {
    let malformed = || ProtocolError::Malformed { kind: "DIFF", line: line.to_string() };
    let body = line.strip_prefix(DIFF_PREFIX).ok_or_else(malformed)?;
    let (name, value) = body.split_once(',').ok_or_else(malformed)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(malformed());
    }
    Ok(Diff { name: name.to_string(), value: value.trim().to_string() })
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
