// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription table and push dispatch.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::key;

/// Receives pushed values for one variable.
///
/// Called on the connection's reader task: implementations must return
/// quickly, since every later push waits for them.
pub trait ValueHandler: Send + Sync {
    fn on_value_changed(&self, value: &str);
}

impl<F> ValueHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_value_changed(&self, value: &str) {
        self(value)
    }
}

/// Variable name -> handler, at most one handler per name.
#[derive(Default)]
pub struct SubscriptionTable {
    handlers: RwLock<HashMap<String, Arc<dyn ValueHandler>>>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `name`, replacing any previous handler.
    pub fn register(&self, name: &str, handler: Arc<dyn ValueHandler>) {
        if self.handlers.write().insert(key(name), handler).is_some() {
            tracing::debug!(var = name, "replaced value handler");
        }
    }

    /// Remove the handler for `name`. Returns whether one was registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.handlers.write().remove(&key(name)).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.read().contains_key(&key(name))
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Deliver a pushed value. Returns whether a handler ran to completion.
    ///
    /// The table lock is released before the handler runs, so handlers may
    /// register or unregister. A panicking handler is logged and skipped.
    pub fn dispatch(&self, name: &str, value: &str) -> bool {
        let handler = self.handlers.read().get(&key(name)).cloned();
        let Some(handler) = handler else {
            return false;
        };
        match catch_unwind(AssertUnwindSafe(|| handler.on_value_changed(value))) {
            Ok(()) => true,
            Err(payload) => {
                tracing::warn!(
                    var = name,
                    value,
                    panic = panic_message(payload.as_ref()),
                    "value handler panicked"
                );
                false
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
