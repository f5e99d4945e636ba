// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use plccoms_client::ClientConfig;

use crate::output::{render_variables, OutputFormat};

pub async fn handle(config: ClientConfig, filter: Option<&str>, format: OutputFormat) -> Result<()> {
    let client = super::connect(config).await?;
    let names = matching(client.variables(), filter);
    client.disconnect().await;

    let rendered = render_variables(&names, format)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

/// Names containing `filter`, ignoring case.
fn matching(names: Vec<String>, filter: Option<&str>) -> Vec<String> {
    let Some(filter) = filter.map(str::to_lowercase) else {
        return names;
    };
    names.into_iter().filter(|name| name.to_lowercase().contains(&filter)).collect()
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
