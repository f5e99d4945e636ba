// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pairing pipelined GET replies with their requests.
//!
//! The PLC is not obliged to answer a pipelined batch in request order, and
//! it does not always echo the variable name. Replies are reconciled in one
//! of three ways depending on how many carry a name.

use std::collections::{HashMap, VecDeque};

use plccoms_wire::GetReply;

use crate::catalog::key;

/// How a batch of replies is paired with its requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOrdering {
    /// Every reply names its variable: pair by name
    Named,
    /// No reply names its variable: pair by position
    Positional,
    /// Some do: pair named replies by name, the rest by position
    Mixed,
}

impl ReplyOrdering {
    pub fn classify(replies: &[GetReply]) -> Self {
        let named = replies.iter().filter(|r| r.name.is_some()).count();
        if named == 0 {
            ReplyOrdering::Positional
        } else if named == replies.len() {
            ReplyOrdering::Named
        } else {
            ReplyOrdering::Mixed
        }
    }
}

/// Values for `requested`, in request order.
///
/// Requests that no reply can be paired with get an empty value.
pub fn reconcile(requested: &[String], replies: Vec<GetReply>) -> Vec<String> {
    let ordering = ReplyOrdering::classify(&replies);
    tracing::trace!(?ordering, requests = requested.len(), "reconciling GET replies");
    match ordering {
        ReplyOrdering::Named => by_name(requested, replies),
        ReplyOrdering::Positional => by_position(requested.len(), replies),
        ReplyOrdering::Mixed => best_effort(requested, replies),
    }
}

fn by_position(count: usize, replies: Vec<GetReply>) -> Vec<String> {
    let mut values: Vec<String> = replies.into_iter().map(|r| r.value).collect();
    values.resize(count, String::new());
    values
}

fn by_name(requested: &[String], replies: Vec<GetReply>) -> Vec<String> {
    let positional: Vec<String> = replies.iter().map(|r| r.value.clone()).collect();
    let mut named: HashMap<String, String> = HashMap::with_capacity(replies.len());
    for reply in replies {
        if let Some(name) = reply.name {
            named.entry(key(&name)).or_insert(reply.value);
        }
    }
    requested
        .iter()
        .enumerate()
        .map(|(i, name)| {
            // A name the PLC spelled differently falls back to its slot
            named.get(&key(name)).or_else(|| positional.get(i)).cloned().unwrap_or_default()
        })
        .collect()
}

fn best_effort(requested: &[String], replies: Vec<GetReply>) -> Vec<String> {
    let keys: Vec<String> = requested.iter().map(|name| key(name)).collect();
    let mut slots: Vec<Option<String>> = vec![None; requested.len()];
    let mut leftovers = VecDeque::new();

    for reply in replies {
        let slot = reply.name.as_deref().map(key).and_then(|reply_key| {
            (0..keys.len()).find(|&i| slots[i].is_none() && keys[i] == reply_key)
        });
        match slot {
            Some(i) => slots[i] = Some(reply.value),
            None => leftovers.push_back(reply.value),
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.or_else(|| leftovers.pop_front()).unwrap_or_default())
        .collect()
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
