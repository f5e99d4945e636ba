// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Push dispatch to value handlers

use std::sync::Arc;

use crate::prelude::*;

#[tokio::test]
async fn pushes_reach_handler_in_wire_order() {
    let plc = plc().await;
    let client = streaming(&plc).await;
    let recorder = Recorder::new();
    client.register_handler("main.light1_onoff", recorder.clone());

    for value in ["1", "0", "1"] {
        plc.push("Main.Light1_OnOff", value);
    }

    assert_eq!(recorder.wait_for(3).await, ["1", "0", "1"]);
    client.disconnect().await;
}

#[tokio::test]
async fn pushes_without_handler_are_ignored() {
    let plc = plc().await;
    let client = streaming(&plc).await;
    let recorder = Recorder::new();
    client.register_handler("Room.Temp", recorder.clone());

    plc.push("Main.Light1_OnOff", "1");
    plc.push("Room.Temp", "22.0");

    assert_eq!(recorder.wait_for(1).await, ["22.0"]);
    client.disconnect().await;
}

#[tokio::test]
async fn registering_again_replaces_handler() {
    let plc = plc().await;
    let client = streaming(&plc).await;
    let first = Recorder::new();
    let second = Recorder::new();
    client.register_handler("Room.Temp", first.clone());
    client.register_handler("ROOM.TEMP", second.clone());

    plc.push("Room.Temp", "23.0");

    assert_eq!(second.wait_for(1).await, ["23.0"]);
    assert!(first.values().is_empty());
    client.disconnect().await;
}

#[tokio::test]
async fn unregistered_handler_receives_nothing() {
    let plc = plc().await;
    let client = streaming(&plc).await;
    let gone = Recorder::new();
    let marker = Recorder::new();
    client.register_handler("Room.Temp", gone.clone());
    client.register_handler("Main.Light2_OnOff", marker.clone());

    assert!(client.unregister_handler("room.temp"));
    assert!(!client.unregister_handler("room.temp"));
    plc.push("Room.Temp", "24.0");
    plc.push("Main.Light2_OnOff", "0");

    // Pushes are delivered in order, so the marker arriving means the
    // earlier push was already dispatched
    assert_eq!(marker.wait_for(1).await, ["0"]);
    assert!(gone.values().is_empty());
    client.disconnect().await;
}

#[tokio::test]
async fn malformed_pushes_are_skipped() {
    let plc = plc().await;
    let client = streaming(&plc).await;
    let recorder = Recorder::new();
    client.register_handler("Room.Temp", recorder.clone());

    plc.push_raw("DIFF:Room.Temp");
    plc.push_raw("DIFF:,5");
    plc.push_raw("garbage without prefix");
    plc.push("Room.Temp", "25.0");

    assert_eq!(recorder.wait_for(1).await, ["25.0"]);
    assert_eq!(client.state(), ConnectionState::Subscribed);
    assert_eq!(client.get("Room.Temp").await.unwrap(), "25.0");
    client.disconnect().await;
}

#[tokio::test]
async fn panicking_handler_does_not_stop_stream() {
    let plc = plc().await;
    let client = streaming(&plc).await;
    let recorder = Recorder::new();
    client.register_handler("Room.Temp", Arc::new(|_: &str| panic!("handler bug")));
    client.register_handler("Main.Light2_OnOff", recorder.clone());

    plc.push("Room.Temp", "26.0");
    plc.push("Main.Light2_OnOff", "0");

    assert_eq!(recorder.wait_for(1).await, ["0"]);
    assert_eq!(plc.connection_count(), 1);
    client.disconnect().await;
}

#[tokio::test]
async fn values_set_by_this_client_are_pushed_back() {
    let plc = plc().await;
    let client = streaming(&plc).await;
    let recorder = Recorder::new();
    client.register_handler("Main.Light1_OnOff", recorder.clone());

    client.set("Main.Light1_OnOff", "1").await.unwrap();

    assert_eq!(recorder.wait_for(1).await, ["1"]);
    client.disconnect().await;
}
