// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process fake PLCComS server for tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use plccoms_wire::{parse_get_reply, Command, GET_PREFIX, LIST_PREFIX, SET_PREFIX, SUBSCRIBE_ALL};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::transport::split;

/// How the fake answers `GET:`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStyle {
    /// `GET:<name>,<value>`
    Echo,
    /// `<name>,<value>`
    Bare,
    /// `,<value>`
    Anonymous,
}

/// A PLCComS server on a loopback port.
///
/// Answers LIST/GET, applies SET, and pushes `DIFF:` lines to every
/// connection that sent `EN:*`.
pub struct FakePlc {
    addr: SocketAddr,
    shared: Arc<Shared>,
    accept: JoinHandle<()>,
}

struct Shared {
    variables: Mutex<Vec<(String, String)>>,
    style: Mutex<ReplyStyle>,
    silent: AtomicBool,
    received: Mutex<Vec<String>>,
    activity: Notify,
    connections: AtomicUsize,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<String>>>,
    generation: Mutex<CancellationToken>,
}

impl FakePlc {
    /// Bind to an ephemeral port and start serving `variables`.
    pub async fn start(variables: &[(&str, &str)]) -> std::io::Result<Self> {
        Self::start_at(0, variables).await
    }

    /// Bind to a fixed loopback port and start serving `variables`.
    pub async fn start_at(port: u16, variables: &[(&str, &str)]) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        let addr = listener.local_addr()?;
        let shared = Arc::new(Shared {
            variables: Mutex::new(
                variables.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect(),
            ),
            style: Mutex::new(ReplyStyle::Echo),
            silent: AtomicBool::new(false),
            received: Mutex::new(Vec::new()),
            activity: Notify::new(),
            connections: AtomicUsize::new(0),
            subscribers: Mutex::new(Vec::new()),
            generation: Mutex::new(CancellationToken::new()),
        });
        let accept = tokio::spawn(accept_loop(listener, Arc::clone(&shared)));
        Ok(Self { addr, shared, accept })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Client config pointed at this server, with test-sized timings.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new("127.0.0.1", self.port())
            .with_reply_timeout(Duration::from_secs(1))
            .with_reconnect(Duration::from_millis(20), Duration::from_millis(100))
            .with_restart_settle(Duration::from_millis(50))
    }

    pub fn set_style(&self, style: ReplyStyle) {
        *self.shared.style.lock() = style;
    }

    /// Stop answering requests; pushes still go out.
    pub fn set_silent(&self, silent: bool) {
        self.shared.silent.store(silent, Ordering::SeqCst);
    }

    /// Change a variable and push the new value to subscribers.
    pub fn push(&self, name: &str, value: &str) {
        self.shared.store(name, value);
        self.push_raw(&format!("DIFF:{name},{value}"));
    }

    /// Send an arbitrary line to every subscribed connection.
    pub fn push_raw(&self, line: &str) {
        self.shared.subscribers.lock().retain(|tx| tx.send(line.to_string()).is_ok());
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.shared.lookup(name).map(|(_, value)| value)
    }

    /// Every line received from clients, in arrival order.
    pub fn received(&self) -> Vec<String> {
        self.shared.received.lock().clone()
    }

    /// Wait until a client has sent `line`. Returns whether it arrived in time.
    pub async fn wait_for_line(&self, line: &str, timeout: Duration) -> bool {
        self.wait_until(timeout, |plc| plc.received().iter().any(|l| l == line)).await
    }

    /// Wait until at least `count` connections sent `EN:*` and are still open.
    pub async fn wait_for_subscribers(&self, count: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, |plc| plc.subscriber_count() >= count).await
    }

    /// Connections accepted so far.
    pub fn connection_count(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.shared.subscribers.lock();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }

    /// Close every open connection; new connections are still accepted.
    pub fn drop_connections(&self) {
        let old = std::mem::take(&mut *self.shared.generation.lock());
        old.cancel();
        self.shared.subscribers.lock().clear();
    }

    async fn wait_until(&self, timeout: Duration, done: impl Fn(&Self) -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.shared.activity.notified();
            if done(self) {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return done(self);
            }
        }
    }
}

impl Drop for FakePlc {
    fn drop(&mut self) {
        self.accept.abort();
        self.shared.generation.lock().cancel();
    }
}

async fn accept_loop(listener: TcpListener, shared: Arc<Shared>) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(e) => {
                tracing::debug!(error = %e, "fake PLC accept failed");
                continue;
            }
        };
        shared.connections.fetch_add(1, Ordering::SeqCst);
        let cancel = shared.generation.lock().clone();
        tokio::spawn(serve(stream, Arc::clone(&shared), cancel));
        shared.activity.notify_waiters();
    }
}

async fn serve(stream: TcpStream, shared: Arc<Shared>, cancel: CancellationToken) {
    let (mut reader, writer) = split(stream);
    let (tx, mut outbox) = mpsc::unbounded_channel::<String>();

    let writes = async {
        while let Some(line) = outbox.recv().await {
            if writer.write_line(&line).await.is_err() {
                break;
            }
        }
    };
    let reads = async {
        while let Ok(line) = reader.read_line().await {
            shared.handle(&line, &tx);
        }
    };
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = reads => {}
        _ = writes => {}
    }
    writer.close().await;
    shared.activity.notify_waiters();
}

impl Shared {
    fn handle(&self, line: &str, tx: &mpsc::UnboundedSender<String>) {
        self.received.lock().push(line.to_string());
        self.activity.notify_waiters();

        if line == SUBSCRIBE_ALL {
            self.subscribers.lock().push(tx.clone());
            self.activity.notify_waiters();
            return;
        }
        if let Some(rest) = line.strip_prefix(SET_PREFIX) {
            if let Some((name, value)) = rest.split_once(',') {
                self.store(name, value);
                let diff = format!("DIFF:{name},{value}");
                self.subscribers.lock().retain(|sub| sub.send(diff.clone()).is_ok());
            }
            return;
        }
        if self.silent.load(Ordering::SeqCst) {
            return;
        }

        if line == Command::List.to_string() {
            for (name, _) in self.variables.lock().iter() {
                let _ = tx.send(format!("{LIST_PREFIX}{name}"));
            }
            let _ = tx.send(LIST_PREFIX.to_string());
        } else if line.starts_with(GET_PREFIX) {
            let requested = parse_get_reply(line).name.unwrap_or_default();
            let (name, value) = self.lookup(&requested).unwrap_or((requested, String::new()));
            let reply = match *self.style.lock() {
                ReplyStyle::Echo => format!("{GET_PREFIX}{name},{value}"),
                ReplyStyle::Bare => format!("{name},{value}"),
                ReplyStyle::Anonymous => format!(",{value}"),
            };
            let _ = tx.send(reply);
        }
    }

    fn lookup(&self, name: &str) -> Option<(String, String)> {
        self.variables.lock().iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).cloned()
    }

    fn store(&self, name: &str, value: &str) {
        let mut variables = self.variables.lock();
        match variables.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = value.to_string(),
            None => variables.push((name.to_string(), value.to_string())),
        }
    }
}
