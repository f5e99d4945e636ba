// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use plccoms_client::ClientConfig;

pub async fn handle(config: ClientConfig, name: &str, value: &str) -> Result<()> {
    let client = super::connect(config).await?;
    let result = client.set(name, value).await;
    client.disconnect().await;
    result?;
    tracing::info!(var = %name, %value, "value written");
    Ok(())
}
