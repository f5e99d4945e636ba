// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PLC restart detection.

use async_trait::async_trait;
use std::future::Future;

/// Notified after the PLC restarted and the catalog was reloaded.
#[async_trait]
pub trait RestartCallback: Send + Sync {
    async fn on_restart(&self);
}

#[async_trait]
impl<F, Fut> RestartCallback for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_restart(&self) {
        self().await
    }
}

/// Watches the restart marker for a 0 -> 1 edge.
///
/// Starts unknown on every connection, so the first observed value never
/// counts as an edge.
#[derive(Debug, Default)]
pub struct RestartDetector {
    last: Option<i64>,
}

impl RestartDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a marker value. Returns `true` on a 0 -> 1 transition.
    ///
    /// Values that are not integers are ignored and leave the stored value
    /// untouched.
    pub fn observe(&mut self, raw: &str) -> bool {
        let Ok(value) = raw.trim().parse::<i64>() else {
            tracing::debug!(value = raw, "ignoring non-numeric restart marker");
            return false;
        };
        let restarted = self.last == Some(0) && value == 1;
        self.last = Some(value);
        restarted
    }

    pub fn last(&self) -> Option<i64> {
        self.last
    }
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
