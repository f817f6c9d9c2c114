// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: a client walks into the subscription cap.

use super::prelude::*;
use loupe_hub::HubConfig;

#[tokio::test]
async fn eleventh_subscribe_is_rejected_and_the_client_stays() {
    let world = World::new(HubConfig::default(), "unused", "unused");
    let mut client = world.connect(TENANT).await;

    // Ten distinct live-tail/progress subscriptions fill the cap: four log
    // types plus three progress pairs (progress + complete each).
    for log_type in ["API", "SQL", "FLTR", "ESCL"] {
        client
            .send(&format!(
                r#"{{"type":"subscribe_live_tail","payload":{{"log_type":"{log_type}"}}}}"#
            ))
            .await;
    }
    for job in ["job-a", "job-b", "job-c"] {
        client
            .send(&format!(
                r#"{{"type":"subscribe_job_progress","payload":{{"job_id":"{job}"}}}}"#
            ))
            .await;
    }
    client.ping_pong().await;
    assert_eq!(client.hub_client.subscription_count(), 10);

    // The next subscribe earns a typed MAX_SUBS error.
    client.send(r#"{"type":"subscribe_live_tail","payload":{"log_type":"API"}}"#).await;
    // (idempotent: still at the cap, no error for a held topic)
    client.ping_pong().await;
    assert_eq!(client.hub_client.subscription_count(), 10);

    client
        .send(r#"{"type":"subscribe_job_progress","payload":{"job_id":"job-overflow"}}"#)
        .await;
    let reply = client.next_text().await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], "MAX_SUBS");

    // Still connected and serviceable.
    client.ping_pong().await;
    assert_eq!(client.hub_client.subscription_count(), 10);
}
