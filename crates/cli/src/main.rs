// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! plccoms: command line client for Tecomat Foxtrot PLCComS servers

mod color;
mod commands;
mod exit_error;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use plccoms_client::{ClientConfig, DEFAULT_PORT};
use tracing_subscriber::EnvFilter;

use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "plccoms",
    version,
    about = "Read, write and watch variables on a Tecomat Foxtrot PLC",
    styles = color::styles()
)]
struct Cli {
    /// PLC host name or address
    #[arg(long, env = "PLCCOMS_HOST", global = true)]
    host: Option<String>,

    /// PLCComS TCP port
    #[arg(long, env = "PLCCOMS_PORT", default_value_t = DEFAULT_PORT, global = true)]
    port: u16,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the PLC answers
    Probe,
    /// List the variables the PLC exposes
    List {
        /// Only show names containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },
    /// Read one or more variables
    Get {
        /// Variable names, in any letter case
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Write a variable
    Set {
        /// Variable name
        name: String,
        /// New value
        value: String,
    },
    /// Print value changes as the PLC pushes them, until Ctrl-C
    Watch {
        /// Variables to watch (default: all)
        names: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            eprintln!("Error: {}", exit.message);
            std::process::exit(exit.code);
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };
    let host = cli
        .host
        .ok_or_else(|| ExitError::usage("no PLC host given: pass --host or set PLCCOMS_HOST"))?;
    let config = ClientConfig::from_env(host, cli.port);
    let format = cli.format;

    match command {
        Commands::Probe => commands::probe::handle(config, format).await,
        Commands::List { filter } => commands::list::handle(config, filter.as_deref(), format).await,
        Commands::Get { names } => commands::get::handle(config, &names, format).await,
        Commands::Set { name, value } => commands::set::handle(config, &name, &value).await,
        Commands::Watch { names } => commands::watch::handle(config, &names, format).await,
    }
}

/// Log to stderr, filtered by `PLCCOMS_LOG`, then `RUST_LOG`, else `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("PLCCOMS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
