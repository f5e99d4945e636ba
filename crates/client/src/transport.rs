// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line transport over a byte stream.
//!
//! The stream is split into a [`LineReader`], owned by exactly one reader
//! task, and a [`LineWriter`] whose send lock keeps concurrent frames from
//! interleaving.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::error::ClientError;

type BoxRead = Box<dyn AsyncRead + Send + Unpin>;
type BoxWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Read half: decodes newline-terminated frames.
pub struct LineReader {
    inner: BufReader<BoxRead>,
}

impl LineReader {
    /// Wait for the next frame. Fails with a closed error on EOF.
    pub async fn read_line(&mut self) -> Result<String, ClientError> {
        Ok(plccoms_wire::read_line(&mut self.inner).await?)
    }
}

/// Write half guarded by the send lock.
pub struct LineWriter {
    inner: Mutex<Option<BoxWrite>>,
}

impl LineWriter {
    pub async fn write_line(&self, text: &str) -> Result<(), ClientError> {
        let mut guard = self.inner.lock().await;
        let writer = guard.as_mut().ok_or(ClientError::Closed)?;
        plccoms_wire::write_line(writer, text).await?;
        Ok(())
    }

    /// Write several frames back to back without releasing the send lock.
    pub async fn write_lines(&self, lines: &[String]) -> Result<(), ClientError> {
        let mut guard = self.inner.lock().await;
        let writer = guard.as_mut().ok_or(ClientError::Closed)?;
        for line in lines {
            plccoms_wire::write_line(writer, line).await?;
        }
        Ok(())
    }

    /// Shut down the write side. Idempotent.
    pub async fn close(&self) {
        let writer = self.inner.lock().await.take();
        if let Some(mut writer) = writer {
            if let Err(e) = writer.shutdown().await {
                tracing::debug!(error = %e, "shutdown of write half failed");
            }
        }
    }
}

/// Connect to a PLC and split the stream.
pub async fn open(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(LineReader, LineWriter), ClientError> {
    let addr = format!("{host}:{port}");
    let stream = match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(ClientError::Connect { addr, source }),
        Err(_) => return Err(ClientError::ConnectTimeout { addr, timeout }),
    };
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!(error = %e, "failed to set TCP_NODELAY");
    }
    Ok(split(stream))
}

/// Split any duplex stream into line halves.
pub fn split<S>(stream: S) -> (LineReader, LineWriter)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read, write) = tokio::io::split(stream);
    let read: BoxRead = Box::new(read);
    let write: BoxWrite = Box::new(write);
    (
        LineReader { inner: BufReader::new(read) },
        LineWriter { inner: Mutex::new(Some(write)) },
    )
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
