// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: the analyzer child dies with OOM on stderr.

use super::prelude::*;
use loupe_hub::HubConfig;

#[tokio::test]
async fn failure_is_announced_once_and_nothing_is_written() {
    let world = World::with_script(
        HubConfig::default(),
        "echo OOM >&2\nexit 1",
        "<API > irrelevant\n",
    );
    let mut client = world.connect(TENANT).await;
    client.subscribe_job_progress("job-1").await;

    world.process_job().await;

    let frames = client.collect_until(|f| f["type"] == "job_complete").await;

    // One failure progress event at zero percent...
    let failures: Vec<&Value> = frames
        .iter()
        .filter(|f| f["type"] == "job_progress" && f["status"] == "failed")
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["progress_pct"], 0);
    assert!(failures[0]["message"].as_str().unwrap().contains("OOM"));

    // ...and exactly one terminal snapshot carrying the reason.
    let completes: Vec<&Value> =
        frames.iter().filter(|f| f["type"] == "job_complete").collect();
    assert_eq!(completes.len(), 1);
    assert_eq!(completes[0]["job"]["status"], "failed");
    assert!(completes[0]["job"]["error_message"].as_str().unwrap().contains("OOM"));

    // No derived data landed anywhere.
    assert!(world.log_store.rows().is_empty());
    assert!(world.cache.is_empty());
}
