// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ping_has_no_payload() {
    let parsed: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
    assert_eq!(parsed, ClientMessage::Ping);
}

#[test]
fn subscribe_job_progress_envelope() {
    let parsed: ClientMessage = serde_json::from_str(
        r#"{"type":"subscribe_job_progress","payload":{"job_id":"job-1"}}"#,
    )
    .unwrap();
    assert_eq!(
        parsed,
        ClientMessage::SubscribeJobProgress(JobRef { job_id: "job-1".to_string() })
    );
}

#[test]
fn missing_payload_field_defaults_to_empty() {
    let parsed: ClientMessage =
        serde_json::from_str(r#"{"type":"subscribe_live_tail","payload":{}}"#).unwrap();
    assert_eq!(parsed, ClientMessage::SubscribeLiveTail(TailRef { log_type: String::new() }));
}

#[yare::parameterized(
    unknown_type = { r#"{"type":"frobnicate"}"# },
    not_json = { "][" },
    no_type = { r#"{"payload":{}}"# },
)]
fn malformed_messages_fail_to_parse(input: &str) {
    assert!(serde_json::from_str::<ClientMessage>(input).is_err());
}

#[test]
fn error_reply_wire_shape() {
    let reply = ServerMessage::error(codes::MAX_SUBS, "subscription limit of 10 reached");
    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["payload"]["code"], "MAX_SUBS");
    assert!(json["payload"]["message"].as_str().unwrap().contains("10"));
}

#[test]
fn pong_wire_shape() {
    let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
    assert_eq!(json, r#"{"type":"pong"}"#);
}
