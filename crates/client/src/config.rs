// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration and environment overrides.

use std::time::Duration;

/// Default PLCComS TCP port
pub const DEFAULT_PORT: u16 = 5010;

/// Variable whose 0 -> 1 transition means the PLC restarted
pub const RESTART_MARKER: &str = "__PLC_RUN";

/// Connection settings for one PLC
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Bound on establishing the TCP connection
    pub connect_timeout: Duration,
    /// Bound on waiting for each reply line of a request
    pub reply_timeout: Duration,
    /// First reconnect delay; also the delay after a lost connection
    pub reconnect_min: Duration,
    /// Cap on the reconnect delay
    pub reconnect_max: Duration,
    /// Pause after a detected restart before reloading the catalog
    pub restart_settle: Duration,
    /// Bound on the whole connectivity probe
    pub probe_timeout: Duration,
    pub restart_marker: String,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_secs(5),
            reply_timeout: Duration::from_secs(5),
            reconnect_min: Duration::from_secs(2),
            reconnect_max: Duration::from_secs(30),
            restart_settle: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(5),
            restart_marker: RESTART_MARKER.to_string(),
        }
    }

    /// Build a config with timing overrides from `PLCCOMS_*_MS` variables.
    pub fn from_env(host: impl Into<String>, port: u16) -> Self {
        let mut config = Self::new(host, port);
        if let Some(d) = env_millis("PLCCOMS_CONNECT_TIMEOUT_MS") {
            config.connect_timeout = d;
        }
        if let Some(d) = env_millis("PLCCOMS_REPLY_TIMEOUT_MS") {
            config.reply_timeout = d;
        }
        if let Some(d) = env_millis("PLCCOMS_RECONNECT_MIN_MS") {
            config.reconnect_min = d;
        }
        if let Some(d) = env_millis("PLCCOMS_RECONNECT_MAX_MS") {
            config.reconnect_max = d;
        }
        if let Some(d) = env_millis("PLCCOMS_RESTART_SETTLE_MS") {
            config.restart_settle = d;
        }
        config
    }

    pub fn with_reconnect(mut self, min: Duration, max: Duration) -> Self {
        self.reconnect_min = min;
        self.reconnect_max = max;
        self
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn with_restart_settle(mut self, settle: Duration) -> Self {
        self.restart_settle = settle;
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
