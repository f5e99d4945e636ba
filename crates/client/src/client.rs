// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The PLC client handle.
//!
//! [`PlcClient`] is a cheap clonable handle over one shared connection.
//! Request/response exchanges serialize on the exchange lock; pushes are
//! dispatched by the connection's reader task; the optional supervisor keeps
//! the connection alive and subscribed.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use plccoms_wire::{Command, Diff};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::restart::RestartCallback;
use crate::session::{PushSink, Session};
use crate::subscription::{SubscriptionTable, ValueHandler};
use crate::supervisor;
use crate::transport::{self, LineWriter};

/// What `connect` does once the socket is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    /// Load the variable catalog
    Full,
    /// Read the restart marker once; no catalog
    Probe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    /// Connected, with value-change pushes enabled
    Subscribed,
}

/// Handle to a PLCComS server.
#[derive(Clone)]
pub struct PlcClient {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) config: ClientConfig,
    catalog: RwLock<Arc<Catalog>>,
    subscriptions: SubscriptionTable,
    restart_callback: RwLock<Option<Arc<dyn RestartCallback>>>,
    /// Exchange lock: whoever holds it owns the reply stream
    session: tokio::sync::Mutex<Option<Session>>,
    /// Write half of the live connection, for fire-and-forget SETs
    writer: RwLock<Option<Arc<LineWriter>>>,
    state: watch::Sender<ConnectionState>,
    supervisor: Mutex<Option<Supervision>>,
}

struct Supervision {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PlcClient {
    pub fn new(config: ClientConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                config,
                catalog: RwLock::new(Arc::new(Catalog::default())),
                subscriptions: SubscriptionTable::new(),
                restart_callback: RwLock::new(None),
                session: tokio::sync::Mutex::new(None),
                writer: RwLock::new(None),
                state,
                supervisor: Mutex::new(None),
            }),
        }
    }

    /// Connect and verify the server with a single GET of the restart marker,
    /// always disconnecting afterwards.
    pub async fn probe(config: ClientConfig) -> Result<(), ClientError> {
        let timeout = config.probe_timeout;
        let client = Self::new(config);
        let result = match tokio::time::timeout(timeout, client.connect(ConnectMode::Probe)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(timeout)),
        };
        client.disconnect().await;
        result
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Open a fresh connection, replacing any existing one.
    pub async fn connect(&self, mode: ConnectMode) -> Result<(), ClientError> {
        self.inner.connect(mode).await
    }

    /// Stop supervision, close the connection and forget the catalog.
    pub async fn disconnect(&self) {
        let supervision = self.inner.supervisor.lock().take();
        if let Some(Supervision { cancel, task }) = supervision {
            cancel.cancel();
            if let Err(e) = task.await {
                if e.is_panic() {
                    warn!(error = %e, "supervisor task panicked");
                }
            }
        }
        self.inner.teardown().await;
        *self.inner.catalog.write() = Arc::new(Catalog::default());
    }

    /// Variable names from the last catalog load, in PLC order.
    pub fn variables(&self) -> Vec<String> {
        self.inner.catalog.read().names().to_vec()
    }

    /// Snapshot of the current catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.inner.catalog.read())
    }

    /// The PLC's spelling of `name`, or `name` itself when not in the catalog.
    pub fn resolve_name(&self, name: &str) -> String {
        self.inner.resolve(name)
    }

    /// Read one variable.
    pub async fn get(&self, name: &str) -> Result<String, ClientError> {
        let name = self.inner.resolve(name);
        let mut slot = self.inner.session.lock().await;
        let session = slot.as_mut().ok_or(ClientError::NotConnected)?;
        let result = session.get(&name, self.inner.config.reply_timeout).await;
        if let Err(e) = &result {
            self.inner.fail_exchange(&mut slot, e).await;
        }
        result
    }

    /// Read several variables in one pipelined batch.
    ///
    /// Values come back in the order of `names`; a variable without a
    /// matching reply gets an empty string.
    pub async fn get_many<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>, ClientError> {
        let names: Vec<String> = names.iter().map(|n| self.inner.resolve(n.as_ref())).collect();
        let mut slot = self.inner.session.lock().await;
        let session = slot.as_mut().ok_or(ClientError::NotConnected)?;
        let result = session.get_many(&names, self.inner.config.reply_timeout).await;
        if let Err(e) = &result {
            self.inner.fail_exchange(&mut slot, e).await;
        }
        result
    }

    /// Write a variable. The PLC sends no acknowledgement.
    pub async fn set(&self, name: &str, value: &str) -> Result<(), ClientError> {
        let writer = self.inner.writer.read().clone().ok_or(ClientError::NotConnected)?;
        let command = Command::Set { name: self.inner.resolve(name), value: value.to_string() };
        let result = writer.write_line(&command.to_string()).await;
        if let Err(e) = &result {
            if e.is_transport() {
                self.inner.teardown().await;
            }
        }
        result
    }

    /// Route pushes for `name` to `handler`, replacing any earlier handler.
    pub fn register_handler(&self, name: &str, handler: Arc<dyn ValueHandler>) {
        let name = self.inner.resolve(name);
        self.inner.subscriptions.register(&name, handler);
    }

    /// Returns whether a handler was registered.
    pub fn unregister_handler(&self, name: &str) -> bool {
        self.inner.subscriptions.unregister(name)
    }

    pub fn register_restart_callback(&self, callback: Arc<dyn RestartCallback>) {
        *self.inner.restart_callback.write() = Some(callback);
    }

    /// Start the background supervisor. No-op if it is already running.
    pub fn start(&self) {
        let mut supervision = self.inner.supervisor.lock();
        if let Some(previous) = supervision.take() {
            if !previous.cancel.is_cancelled() && !previous.task.is_finished() {
                *supervision = Some(previous);
                return;
            }
            // A stopped supervisor still winding down must not close the
            // connection the new one opens
            previous.task.abort();
        }
        let cancel = CancellationToken::new();
        let task = tokio::spawn(supervisor::run(Arc::clone(&self.inner), cancel.clone()));
        *supervision = Some(Supervision { cancel, task });
    }

    /// Signal the supervisor to stop; it closes the connection on its way out.
    pub fn stop(&self) {
        if let Some(supervision) = self.inner.supervisor.lock().as_ref() {
            supervision.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .supervisor
            .lock()
            .as_ref()
            .is_some_and(|s| !s.cancel.is_cancelled() && !s.task.is_finished())
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }
}

impl Inner {
    fn resolve(&self, name: &str) -> String {
        self.catalog.read().resolve(name)
    }

    pub(crate) async fn connect(self: &Arc<Self>, mode: ConnectMode) -> Result<(), ClientError> {
        let mut slot = self.session.lock().await;
        self.teardown_locked(&mut slot).await;

        let config = &self.config;
        let (reader, writer) =
            transport::open(&config.host, config.port, config.connect_timeout).await?;
        let sink: Arc<dyn PushSink> = Arc::new(ClientSink(Arc::downgrade(self)));
        let mut session = Session::spawn(reader, writer, sink, config.restart_marker.clone());

        let loaded = match mode {
            ConnectMode::Full => session.list_variables(config.reply_timeout).await.map(|catalog| {
                info!(variables = catalog.len(), "loaded variable catalog");
                *self.catalog.write() = Arc::new(catalog);
            }),
            ConnectMode::Probe => {
                session.get(&config.restart_marker, config.reply_timeout).await.map(|value| {
                    debug!(var = %config.restart_marker, %value, "probe reply");
                })
            }
        };
        if let Err(e) = loaded {
            session.close().await;
            return Err(e);
        }

        *self.writer.write() = Some(session.writer());
        *slot = Some(session);
        drop(slot);
        self.set_state(ConnectionState::Connected);
        info!(host = %config.host, port = config.port, ?mode, "connected to PLC");
        Ok(())
    }

    /// Whether a live connection is open
    pub(crate) async fn is_connected(&self) -> bool {
        matches!(self.session.lock().await.as_ref(), Some(session) if !session.is_closed())
    }

    /// Enable pushes on the live connection. Returns its closed token.
    pub(crate) async fn subscribe(&self) -> Result<CancellationToken, ClientError> {
        let mut slot = self.session.lock().await;
        let session = slot.as_mut().ok_or(ClientError::NotConnected)?;
        let first = !session.is_subscribed();
        let result = session.subscribe().await;
        let closed = session.closed_token();
        if let Err(e) = result {
            self.teardown_locked(&mut slot).await;
            return Err(e);
        }
        drop(slot);
        if first {
            info!("subscribed to value changes");
        }
        self.set_state(ConnectionState::Subscribed);
        Ok(closed)
    }

    /// Close the connection, if any, and mark the client disconnected.
    pub(crate) async fn teardown(&self) {
        let mut slot = self.session.lock().await;
        self.teardown_locked(&mut slot).await;
    }

    /// Tear down a connection that has ended. A live connection opened in
    /// its place is left alone; returns false in that case.
    pub(crate) async fn teardown_if_closed(&self) -> bool {
        let mut slot = self.session.lock().await;
        if matches!(slot.as_ref(), Some(session) if !session.is_closed()) {
            return false;
        }
        self.teardown_locked(&mut slot).await;
        true
    }

    async fn teardown_locked(&self, slot: &mut Option<Session>) {
        *self.writer.write() = None;
        if let Some(session) = slot.take() {
            session.close().await;
        }
        self.set_state(ConnectionState::Disconnected);
    }

    /// Drop the connection after a failed exchange if the transport is at
    /// fault. A timed-out request may still be answered later, so the
    /// connection cannot be trusted to pair replies any more.
    async fn fail_exchange(&self, slot: &mut Option<Session>, error: &ClientError) {
        if error.is_transport() {
            warn!(error = %error, "request failed, closing connection");
            self.teardown_locked(slot).await;
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    async fn handle_restart(self: Arc<Self>, closed: CancellationToken) {
        let settle = self.config.restart_settle;
        info!(settle_ms = settle.as_millis() as u64, "PLC restart detected");
        tokio::select! {
            _ = closed.cancelled() => {
                debug!("connection closed before catalog reload");
                return;
            }
            _ = tokio::time::sleep(settle) => {}
        }

        let mut slot = self.session.lock().await;
        let Some(session) = slot.as_mut() else {
            debug!("connection closed before catalog reload");
            return;
        };
        match session.list_variables(self.config.reply_timeout).await {
            Ok(catalog) => {
                info!(variables = catalog.len(), "reloaded variable catalog");
                *self.catalog.write() = Arc::new(catalog);
            }
            Err(e) => {
                warn!(error = %e, "catalog reload after restart failed");
                self.fail_exchange(&mut slot, &e).await;
                return;
            }
        }
        drop(slot);

        let callback = self.restart_callback.read().clone();
        if let Some(callback) = callback {
            tokio::spawn(async move { callback.on_restart().await });
        }
    }
}

/// Push sink for a connection owned by the client.
///
/// Holds the client weakly so the reader task never keeps it alive.
struct ClientSink(Weak<Inner>);

impl PushSink for ClientSink {
    fn deliver(&self, diff: &Diff) {
        if let Some(inner) = self.0.upgrade() {
            inner.subscriptions.dispatch(&diff.name, &diff.value);
        }
    }

    fn restarted(&self, closed: &CancellationToken) {
        // The exchange lock may be held by a request waiting on this very
        // reader task, so the reload runs elsewhere.
        if let Some(inner) = self.0.upgrade() {
            tokio::spawn(inner.handle_restart(closed.clone()));
        }
    }

    fn lost(&self) {
        if let Some(inner) = self.0.upgrade() {
            *inner.writer.write() = None;
            inner.set_state(ConnectionState::Disconnected);
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
