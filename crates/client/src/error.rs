// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use plccoms_wire::ProtocolError;
use thiserror::Error;

/// Errors from the PLCComS client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connecting to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("not connected to the PLC")]
    NotConnected,

    #[error("connection closed")]
    Closed,

    #[error("no reply from the PLC within {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// Whether this error means the connection is unusable.
    ///
    /// Transport faults are recovered by reconnecting; everything else is
    /// the caller's problem.
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::Connect { .. }
            | ClientError::ConnectTimeout { .. }
            | ClientError::Closed
            | ClientError::Timeout(_) => true,
            ClientError::Protocol(ProtocolError::ConnectionClosed | ProtocolError::Io(_)) => true,
            ClientError::NotConnected | ClientError::Protocol(_) => false,
        }
    }
}
