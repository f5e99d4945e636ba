// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! plccoms-client: async client for Tecomat Foxtrot PLCComS servers.
//!
//! ```no_run
//! # async fn demo() -> Result<(), plccoms_client::ClientError> {
//! use std::sync::Arc;
//! use plccoms_client::{ClientConfig, ConnectMode, PlcClient};
//!
//! let client = PlcClient::new(ClientConfig::new("192.168.1.10", 5010));
//! client.connect(ConnectMode::Full).await?;
//! client.register_handler("Main.Light1_OnOff", Arc::new(|v: &str| println!("light: {v}")));
//! client.start();
//! client.set("Main.Light1_OnOff", "1").await?;
//! # Ok(())
//! # }
//! ```

mod backoff;
mod catalog;
mod client;
mod config;
mod error;
mod query;
mod restart;
mod session;
mod subscription;
mod supervisor;
mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;


pub use backoff::{Backoff, BACKOFF_FACTOR};
pub use catalog::{Catalog, CatalogBuilder};
pub use client::{ConnectMode, ConnectionState, PlcClient};
pub use config::{ClientConfig, DEFAULT_PORT, RESTART_MARKER};
pub use error::ClientError;
pub use query::{reconcile, ReplyOrdering};
pub use restart::{RestartCallback, RestartDetector};
pub use subscription::{SubscriptionTable, ValueHandler};
