// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream pushed value changes until interrupted.

use std::sync::Arc;

use anyhow::Result;
use plccoms_client::ClientConfig;

use crate::color;
use crate::output::{render_change, OutputFormat};

pub async fn handle(config: ClientConfig, names: &[String], format: OutputFormat) -> Result<()> {
    let client = super::connect(config).await?;
    let names: Vec<String> = if names.is_empty() {
        client.variables()
    } else {
        names.iter().map(|name| client.resolve_name(name)).collect()
    };
    if names.is_empty() {
        tracing::warn!("the PLC reports no variables; nothing to watch");
    }

    for name in &names {
        let var = name.clone();
        client.register_handler(
            name,
            Arc::new(move |value: &str| match render_change(&var, value, format) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, var = %var, "failed to render change"),
            }),
        );
    }
    client.register_restart_callback(Arc::new(|| async {
        eprintln!("{}", color::muted("PLC restarted, catalog reloaded"));
    }));

    client.start();
    let interrupted = tokio::signal::ctrl_c().await;
    client.disconnect().await;
    interrupted?;
    Ok(())
}
