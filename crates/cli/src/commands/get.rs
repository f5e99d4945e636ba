// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use plccoms_client::ClientConfig;

use crate::output::{render_values, OutputFormat};

pub async fn handle(config: ClientConfig, names: &[String], format: OutputFormat) -> Result<()> {
    let client = super::connect(config).await?;
    let result = client.get_many(names).await;
    let resolved: Vec<String> = names.iter().map(|name| client.resolve_name(name)).collect();
    client.disconnect().await;

    let values: Vec<(String, String)> = resolved.into_iter().zip(result?).collect();
    println!("{}", render_values(&values, format)?);
    Ok(())
}
