// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for specs

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::process::{Child, Stdio};
use std::sync::Arc;
use std::time::Duration;

use assert_cmd::cargo::CommandCargoExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
pub use plccoms_client::test_support::{FakePlc, ReplyStyle};
pub use plccoms_client::{
    ClientError, ConnectMode, ConnectionState, PlcClient, RestartCallback, ValueHandler,
};

/// Upper bound on any single wait in a spec
pub const WAIT: Duration = Duration::from_secs(3);

/// Variables served by [`plc`]
pub const VARIABLES: &[(&str, &str)] = &[
    ("Main.Light1_OnOff", "0"),
    ("Main.Light2_OnOff", "1"),
    ("Room.Temp", "21.5"),
    ("Room.Label", "Obývák"),
    ("__PLC_RUN", "1"),
];

pub async fn plc() -> FakePlc {
    FakePlc::start(VARIABLES).await.unwrap()
}

/// A client with the catalog loaded.
pub async fn connected(plc: &FakePlc) -> PlcClient {
    let client = PlcClient::new(plc.config());
    client.connect(ConnectMode::Full).await.unwrap();
    client
}

/// A client that is connected, supervised and subscribed.
pub async fn streaming(plc: &FakePlc) -> PlcClient {
    let client = connected(plc).await;
    client.start();
    wait_for_state(&client, ConnectionState::Subscribed).await;
    assert!(plc.wait_for_subscribers(1, WAIT).await, "client never subscribed");
    client
}

pub async fn wait_for_state(client: &PlcClient, state: ConnectionState) {
    let mut states = client.subscribe_state();
    tokio::time::timeout(WAIT, states.wait_for(|s| *s == state))
        .await
        .unwrap_or_else(|_| panic!("client never reached {state:?}"))
        .unwrap();
}

/// Poll `done` until it holds or [`WAIT`] elapses.
pub async fn eventually(done: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !done() {
        if tokio::time::Instant::now() > deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    true
}

// ── Value handlers ──────────────────────────────────────────────────────

/// Handler that records every value it receives.
#[derive(Default)]
pub struct Recorder {
    values: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn values(&self) -> Vec<String> {
        self.values.lock().clone()
    }

    /// Wait until at least `count` values arrived, then return them all.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        eventually(|| self.values.lock().len() >= count).await;
        self.values()
    }
}

impl ValueHandler for Recorder {
    fn on_value_changed(&self, value: &str) {
        self.values.lock().push(value.to_string());
    }
}

// ── CLI ─────────────────────────────────────────────────────────────────

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

/// The `plccoms` binary with a clean environment.
pub fn cli() -> CliBuilder {
    let mut cmd = assert_cmd::Command::cargo_bin("plccoms").unwrap();
    cmd.env_remove("PLCCOMS_HOST")
        .env_remove("PLCCOMS_PORT")
        .env_remove("PLCCOMS_LOG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .timeout(Duration::from_secs(10));
    CliBuilder { cmd }
}

/// The `plccoms` binary pointed at `plc` through the environment.
pub fn cli_for(plc: &FakePlc) -> CliBuilder {
    cli().env("PLCCOMS_HOST", "127.0.0.1").env("PLCCOMS_PORT", plc.port().to_string())
}

impl CliBuilder {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run, asserting exit code 0.
    pub fn passes(self) -> RunAssert {
        self.run(0)
    }

    /// Run, asserting the given non-zero exit code.
    pub fn fails_with(self, code: i32) -> RunAssert {
        self.run(code)
    }

    /// Run on a blocking thread, so a fake PLC on the test runtime can answer.
    pub async fn passes_async(self) -> RunAssert {
        tokio::task::spawn_blocking(move || self.passes()).await.unwrap()
    }

    pub async fn fails_with_async(self, code: i32) -> RunAssert {
        tokio::task::spawn_blocking(move || self.fails_with(code)).await.unwrap()
    }

    fn run(mut self, code: i32) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        assert_eq!(
            output.status.code(),
            Some(code),
            "unexpected exit status\nstdout:\n{}\nstderr:\n{}",
            run.stdout,
            run.stderr
        );
        run
    }
}

/// A long-running `plccoms` process pointed at `plc`, stdout read by line.
///
/// The process is killed on drop.
pub struct Running {
    child: Child,
    lines: mpsc::UnboundedReceiver<String>,
}

pub fn spawn_cli_for<I, S>(plc: &FakePlc, args: I) -> Running
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = std::process::Command::cargo_bin("plccoms")
        .unwrap()
        .env_remove("PLCCOMS_LOG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("PLCCOMS_HOST", "127.0.0.1")
        .env("PLCCOMS_PORT", plc.port().to_string())
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let (tx, lines) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in BufReader::new(stdout).lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    Running { child, lines }
}

impl Running {
    /// The next stdout line, or `None` if none arrives within [`WAIT`].
    pub async fn next_line(&mut self) -> Option<String> {
        tokio::time::timeout(WAIT, self.lines.recv()).await.ok().flatten()
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub struct RunAssert {
    pub stdout: String,
    pub stderr: String,
}

impl RunAssert {
    pub fn stdout_has(self, expected: &str) -> Self {
        assert!(
            self.stdout.contains(expected),
            "stdout does not contain {expected:?}\nstdout:\n{}",
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        assert!(
            !self.stdout.contains(unexpected),
            "stdout unexpectedly contains {unexpected:?}\nstdout:\n{}",
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        assert!(
            self.stderr.contains(expected),
            "stderr does not contain {expected:?}\nstderr:\n{}",
            self.stderr
        );
        self
    }

    pub fn stdout_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}
