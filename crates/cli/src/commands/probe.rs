// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use plccoms_client::{ClientConfig, PlcClient};

use crate::exit_error::ExitError;
use crate::output::{render_probe, OutputFormat};

pub async fn handle(config: ClientConfig, format: OutputFormat) -> Result<()> {
    let addr = config.addr();
    PlcClient::probe(config)
        .await
        .map_err(|e| ExitError::unreachable(format!("PLC at {addr} is not reachable: {e}")))?;
    println!("{}", render_probe(&addr, format)?);
    Ok(())
}
