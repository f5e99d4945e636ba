// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod get;
pub mod list;
pub mod probe;
pub mod set;
pub mod watch;

use anyhow::Result;
use plccoms_client::{ClientConfig, ConnectMode, PlcClient};

use crate::exit_error::ExitError;

/// Connect and load the catalog, mapping failure to the unreachable exit code.
pub(crate) async fn connect(config: ClientConfig) -> Result<PlcClient> {
    let addr = config.addr();
    let client = PlcClient::new(config);
    client
        .connect(ConnectMode::Full)
        .await
        .map_err(|e| ExitError::unreachable(format!("cannot reach PLC at {addr}: {e}")))?;
    Ok(client)
}
