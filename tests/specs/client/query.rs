// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GET, batched GET and SET

use crate::prelude::*;

#[tokio::test]
async fn get_reads_quoted_and_accented_values() {
    let plc = plc().await;
    let client = connected(&plc).await;

    assert_eq!(client.get("room.label").await.unwrap(), "Obývák");
    assert_eq!(client.get("Room.Temp").await.unwrap(), "21.5");
}

#[tokio::test]
async fn get_handles_every_reply_style() {
    for style in [ReplyStyle::Echo, ReplyStyle::Bare, ReplyStyle::Anonymous] {
        let plc = plc().await;
        plc.set_style(style);
        let client = connected(&plc).await;

        assert_eq!(client.get("Main.Light2_OnOff").await.unwrap(), "1", "style {style:?}");
    }
}

#[tokio::test]
async fn get_many_preserves_request_order() {
    for style in [ReplyStyle::Echo, ReplyStyle::Bare, ReplyStyle::Anonymous] {
        let plc = plc().await;
        plc.set_style(style);
        let client = connected(&plc).await;

        let values = client.get_many(&["room.temp", "__plc_run", "main.light1_onoff"]).await;
        assert_eq!(values.unwrap(), ["21.5", "1", "0"], "style {style:?}");
    }
}

#[tokio::test]
async fn get_of_unknown_variable_is_empty() {
    let plc = plc().await;
    let client = connected(&plc).await;

    assert_eq!(client.get("Nope").await.unwrap(), "");
    assert!(plc.received().contains(&"GET:Nope".to_string()));
}

#[tokio::test]
async fn set_is_visible_to_later_get() {
    let plc = plc().await;
    let client = connected(&plc).await;

    client.set("main.light1_onoff", "1").await.unwrap();
    assert!(plc.wait_for_line("SET:Main.Light1_OnOff,1", WAIT).await);
    assert_eq!(client.get("Main.Light1_OnOff").await.unwrap(), "1");
}

#[tokio::test]
async fn set_rejects_multiline_values() {
    let plc = plc().await;
    let client = connected(&plc).await;

    let err = client.set("Room.Label", "a\nb").await.unwrap_err();
    assert!(!err.is_transport(), "got {err:?}");
    assert_eq!(client.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn set_rejects_values_outside_code_page() {
    let plc = plc().await;
    let client = connected(&plc).await;

    let err = client.set("Room.Label", "温").await.unwrap_err();
    assert!(!err.is_transport(), "got {err:?}");
    assert_eq!(client.state(), ConnectionState::Connected);

    client.set("Room.Label", "Kuchyň").await.unwrap();
    assert!(plc.wait_for_line("SET:Room.Label,Kuchyň", WAIT).await);
    assert!(!plc.received().iter().any(|line| line.contains('&')));
}

#[tokio::test]
async fn queries_fail_fast_when_disconnected() {
    let plc = plc().await;
    let client = connected(&plc).await;
    client.disconnect().await;

    assert!(matches!(client.get("Room.Temp").await, Err(ClientError::NotConnected)));
    assert!(matches!(client.get_many(&["Room.Temp"]).await, Err(ClientError::NotConnected)));
    assert!(matches!(client.set("Room.Temp", "1").await, Err(ClientError::NotConnected)));
}

#[tokio::test]
async fn get_is_safe_while_streaming() {
    let plc = plc().await;
    let client = streaming(&plc).await;
    let recorder = Recorder::new();
    client.register_handler("Main.Light2_OnOff", recorder.clone());

    for i in 0..20 {
        plc.push("Main.Light2_OnOff", &i.to_string());
        assert_eq!(client.get("Room.Temp").await.unwrap(), "21.5");
    }

    assert_eq!(recorder.wait_for(20).await.len(), 20);
    client.disconnect().await;
}
