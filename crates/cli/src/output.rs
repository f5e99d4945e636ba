// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of command results as text or JSON.

use clap::ValueEnum;
use serde::Serialize;

use crate::color;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct VariableValue<'a> {
    var: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct ProbeResult<'a> {
    addr: &'a str,
    reachable: bool,
}

/// Catalog listing, one name per line in text mode.
pub fn render_variables(names: &[String], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(names.join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(names)?),
    }
}

/// Variable values, aligned on the name column in text mode.
pub fn render_values(values: &[(String, String)], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => {
            let width = values.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);
            let lines: Vec<String> = values
                .iter()
                .map(|(name, value)| {
                    let pad = " ".repeat(width - name.chars().count());
                    format!("{}{pad} = {value}", color::name(name))
                })
                .collect();
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => {
            let entries: Vec<VariableValue<'_>> = values
                .iter()
                .map(|(var, value)| VariableValue { var, value })
                .collect();
            Ok(serde_json::to_string_pretty(&entries)?)
        }
    }
}

/// One pushed change. JSON mode emits one compact object per line.
pub fn render_change(var: &str, value: &str, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(format!("{} = {value}", color::name(var))),
        OutputFormat::Json => Ok(serde_json::to_string(&VariableValue { var, value })?),
    }
}

pub fn render_probe(addr: &str, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(format!("PLC at {} is reachable", color::name(addr))),
        OutputFormat::Json => {
            Ok(serde_json::to_string_pretty(&ProbeResult { addr, reachable: true })?)
        }
    }
}
