// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background connection supervisor.
//!
//! Connects, subscribes and waits for the connection to drop, forever,
//! sleeping a growing backoff delay between attempts. Only cancellation
//! ends the loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::client::{ConnectMode, Inner};
use crate::error::ClientError;

pub(crate) async fn run(inner: Arc<Inner>, cancel: CancellationToken) {
    let config = &inner.config;
    let mut backoff = Backoff::new(config.reconnect_min, config.reconnect_max);
    info!(host = %config.host, port = config.port, "supervisor started");

    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = stream(&inner, &mut backoff) => result,
        };
        if !inner.teardown_if_closed().await {
            debug!("connection replaced, subscribing to the new one");
            continue;
        }
        let delay = backoff.next_delay();
        let delay_ms = delay.as_millis() as u64;
        match result {
            Ok(()) => warn!(delay_ms, "PLC connection lost, reconnecting"),
            Err(e) => warn!(error = %e, delay_ms, "PLC connection failed, reconnecting"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    inner.teardown().await;
    info!("supervisor stopped");
}

/// One connection lifetime: connect if needed, subscribe, then wait until
/// the reader task sees the connection end.
async fn stream(inner: &Arc<Inner>, backoff: &mut Backoff) -> Result<(), ClientError> {
    if !inner.is_connected().await {
        inner.connect(ConnectMode::Full).await?;
        backoff.reset();
    }
    let closed = inner.subscribe().await?;
    closed.cancelled().await;
    Ok(())
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
