// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: a slow subscriber under a burst of broadcasts.

use super::prelude::*;
use loupe_core::Topic;
use loupe_hub::HubConfig;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn burst_against_a_two_slot_buffer_drops_but_stays_alive() {
    let config = HubConfig { send_buffer: 2, ..Default::default() };
    let world = World::new(config, "unused", "unused");
    let mut client = world.connect(TENANT).await;

    client.send(r#"{"type":"subscribe_live_tail","payload":{"log_type":"API"}}"#).await;
    client.ping_pong().await;

    // 100 broadcasts into a queue the write pump barely drains.
    let topic = Topic::live_tail(&TENANT.into(), loupe_core::LogType::Api);
    for i in 0..100 {
        world
            .hub
            .broadcast(topic.clone(), Arc::from(format!(r#"{{"type":"burst","n":{i}}}"#).as_str()))
            .await
            .unwrap();
        assert!(client.hub_client.queue().len() <= 2, "queue exceeded its bound");
    }

    // Let the hub loop drain the burst before fencing with a ping.
    tokio::time::sleep(Duration::from_millis(50)).await;

    // No panic, no disconnect: a fresh ping still round-trips promptly.
    let started = std::time::Instant::now();
    client.send(r#"{"type":"ping"}"#).await;
    let mut burst_frames = 0usize;
    loop {
        let frame = client.next_text().await;
        if frame["type"] == "pong" {
            break;
        }
        assert_eq!(frame["type"], "burst");
        burst_frames += 1;
    }
    assert!(started.elapsed() < Duration::from_secs(1));

    // Lossy by design: far fewer than 100 made it through.
    assert!(burst_frames < 100);
}
