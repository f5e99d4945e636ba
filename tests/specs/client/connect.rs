// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connecting and the variable catalog

use crate::prelude::*;

#[tokio::test]
async fn catalog_lists_variables_in_plc_order() {
    let plc = plc().await;
    let client = connected(&plc).await;

    let expected: Vec<&str> = VARIABLES.iter().map(|(name, _)| *name).collect();
    assert_eq!(client.variables(), expected);
    assert_eq!(client.catalog().len(), VARIABLES.len());
}

#[tokio::test]
async fn names_resolve_case_insensitively() {
    let plc = plc().await;
    let client = connected(&plc).await;

    assert_eq!(client.resolve_name("main.light1_onoff"), "Main.Light1_OnOff");
    assert_eq!(client.resolve_name("MAIN.LIGHT1_ONOFF"), "Main.Light1_OnOff");
    assert_eq!(client.resolve_name("Unknown_Var"), "Unknown_Var");
}

#[tokio::test]
async fn reconnecting_replaces_the_connection() {
    let plc = plc().await;
    let client = connected(&plc).await;
    client.connect(ConnectMode::Full).await.unwrap();

    assert_eq!(plc.connection_count(), 2);
    assert_eq!(client.get("Room.Temp").await.unwrap(), "21.5");
}

#[tokio::test]
async fn probe_checks_marker_without_catalog() {
    let plc = plc().await;
    PlcClient::probe(plc.config()).await.unwrap();

    assert_eq!(plc.received(), ["GET:__PLC_RUN"]);
}

#[tokio::test]
async fn unreachable_plc_is_a_transport_error() {
    let plc = plc().await;
    let config = plc.config();
    drop(plc);
    // Give the fake a moment to release its listener
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let client = PlcClient::new(config);
    let err = client.connect(ConnectMode::Full).await.unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
    assert_eq!(client.state(), ConnectionState::Disconnected);
}
