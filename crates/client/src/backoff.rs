// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Growth factor between consecutive reconnect delays
pub const BACKOFF_FACTOR: f64 = 1.6;

/// Capped exponential reconnect delay
#[derive(Debug, Clone)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(min: Duration, max: Duration) -> Self {
        let max = max.max(min);
        Self { min, max, current: min }
    }

    /// The delay to sleep now; grows the delay for the next failure.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        let grown = Duration::try_from_secs_f64(self.current.as_secs_f64() * BACKOFF_FACTOR)
            .unwrap_or(self.max);
        self.current = grown.min(self.max);
        delay
    }

    /// Back to the minimum after a successful connect.
    pub fn reset(&mut self) {
        self.current = self.min;
    }

    pub fn peek(&self) -> Duration {
        self.current
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
