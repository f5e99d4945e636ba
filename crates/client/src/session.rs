// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One live PLC connection.
//!
//! A dedicated reader task (the pump) is the only code that reads the
//! socket. It dispatches `DIFF:` pushes inline, in wire order, and forwards
//! every other line to a reply channel. Request/response exchanges run with
//! `&mut Session`, which the client only hands out under its exchange lock,
//! so each request sees exactly its own replies.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use plccoms_wire::{parse_diff, parse_get_reply, Command, Diff, DIFF_PREFIX};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::catalog::{Catalog, CatalogBuilder};
use crate::error::ClientError;
use crate::query::reconcile;
use crate::restart::RestartDetector;
use crate::transport::{LineReader, LineWriter};

/// Receiver of pushes read by the pump.
pub(crate) trait PushSink: Send + Sync + 'static {
    /// A parsed DIFF push, delivered in wire order
    fn deliver(&self, diff: &Diff);
    /// The restart marker went from 0 to 1. `closed` is cancelled when this
    /// connection ends.
    fn restarted(&self, closed: &CancellationToken);
    /// The pump stopped because the connection dropped
    fn lost(&self);
}

pub(crate) struct Session {
    writer: Arc<LineWriter>,
    replies: mpsc::UnboundedReceiver<String>,
    /// Set while an exchange waits for replies; other lines are dropped
    expecting: Arc<AtomicBool>,
    pump: JoinHandle<()>,
    closed: CancellationToken,
    subscribed: bool,
}

impl Session {
    /// Start the pump for a freshly opened connection.
    pub(crate) fn spawn(
        reader: LineReader,
        writer: LineWriter,
        sink: Arc<dyn PushSink>,
        restart_marker: String,
    ) -> Self {
        let (reply_tx, replies) = mpsc::unbounded_channel();
        let closed = CancellationToken::new();
        let expecting = Arc::new(AtomicBool::new(false));
        let pump = tokio::spawn(pump(
            reader,
            Replies { tx: reply_tx, expecting: Arc::clone(&expecting) },
            sink,
            restart_marker,
            closed.clone(),
        ));
        Self { writer: Arc::new(writer), replies, expecting, pump, closed, subscribed: false }
    }

    /// Cancelled once the pump stops reading
    pub(crate) fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub(crate) fn writer(&self) -> Arc<LineWriter> {
        Arc::clone(&self.writer)
    }

    /// Send `LIST:` and collect the catalog.
    pub(crate) async fn list_variables(&mut self, timeout: Duration) -> Result<Catalog, ClientError> {
        let _expecting = self.expect_replies();
        self.writer.write_line(&Command::List.to_string()).await?;
        let mut builder = CatalogBuilder::new();
        loop {
            let line = self.next_reply(timeout).await?;
            if !builder.push_line(&line) {
                break;
            }
        }
        Ok(builder.finish())
    }

    /// GET one variable; `name` is already resolved.
    pub(crate) async fn get(&mut self, name: &str, timeout: Duration) -> Result<String, ClientError> {
        let _expecting = self.expect_replies();
        self.writer.write_line(&Command::Get(name.to_string()).to_string()).await?;
        let line = self.next_reply(timeout).await?;
        Ok(parse_get_reply(&line).value)
    }

    /// Pipeline GETs for all `names`, then read one reply per request.
    pub(crate) async fn get_many(
        &mut self,
        names: &[String],
        timeout: Duration,
    ) -> Result<Vec<String>, ClientError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let _expecting = self.expect_replies();
        let frames: Vec<String> =
            names.iter().map(|name| Command::Get(name.clone()).to_string()).collect();
        self.writer.write_lines(&frames).await?;
        let mut replies = Vec::with_capacity(names.len());
        for _ in names {
            replies.push(parse_get_reply(&self.next_reply(timeout).await?));
        }
        Ok(reconcile(names, replies))
    }

    /// Send the wildcard subscription once per connection.
    pub(crate) async fn subscribe(&mut self) -> Result<(), ClientError> {
        if self.subscribed {
            return Ok(());
        }
        self.writer.write_line(&Command::SubscribeAll.to_string()).await?;
        self.subscribed = true;
        Ok(())
    }

    /// Stop the pump and shut the connection.
    pub(crate) async fn close(self) {
        self.pump.abort();
        self.writer.close().await;
        self.closed.cancel();
    }

    /// Drop stale lines and accept replies until the guard goes away.
    fn expect_replies(&mut self) -> ExpectGuard {
        self.drain_stale();
        self.expecting.store(true, Ordering::SeqCst);
        ExpectGuard(Arc::clone(&self.expecting))
    }

    async fn next_reply(&mut self, timeout: Duration) -> Result<String, ClientError> {
        match tokio::time::timeout(timeout, self.replies.recv()).await {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(ClientError::Closed),
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }

    /// Drop lines nobody asked for, so they cannot pass for a reply.
    fn drain_stale(&mut self) {
        while let Ok(line) = self.replies.try_recv() {
            tracing::debug!(%line, "discarding unsolicited line");
        }
    }
}

struct ExpectGuard(Arc<AtomicBool>);

impl Drop for ExpectGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Pump side of the reply channel.
struct Replies {
    tx: mpsc::UnboundedSender<String>,
    expecting: Arc<AtomicBool>,
}

impl Replies {
    /// Forward `line` if an exchange is waiting. Returns false once the
    /// session is gone.
    fn forward(&self, line: String) -> bool {
        if !self.expecting.load(Ordering::SeqCst) {
            tracing::debug!(%line, "discarding unsolicited line");
            return !self.tx.is_closed();
        }
        self.tx.send(line).is_ok()
    }
}

async fn pump(
    mut reader: LineReader,
    replies: Replies,
    sink: Arc<dyn PushSink>,
    restart_marker: String,
    closed: CancellationToken,
) {
    let _closed = closed.clone().drop_guard();
    let mut restart = RestartDetector::new();
    loop {
        let line = match reader.read_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::info!(error = %e, "PLC connection lost");
                sink.lost();
                return;
            }
        };
        if !line.starts_with(DIFF_PREFIX) {
            if !replies.forward(line) {
                return;
            }
            continue;
        }
        let diff = match parse_diff(&line) {
            Ok(diff) => diff,
            Err(e) => {
                tracing::debug!(error = %e, "discarding push");
                continue;
            }
        };
        if diff.name.eq_ignore_ascii_case(&restart_marker) && restart.observe(&diff.value) {
            sink.restarted(&closed);
        }
        sink.deliver(&diff);
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
