// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: the driving context is cancelled mid-analysis.

use super::prelude::*;
use loupe_core::job::JobStatus;
use loupe_hub::HubConfig;
use std::time::{Duration, Instant};

#[tokio::test]
async fn cancelled_job_fails_fast_with_the_cancelled_reason() {
    // The fake analyzer would sleep far longer than the test allows; the
    // grace-kill path must reclaim it.
    let world = World::with_script(HubConfig::default(), "sleep 30", "<API > irrelevant\n");

    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    world.process_job_with(&token).await;

    // SIGTERM + 2s grace, nowhere near the child's 30s sleep.
    assert!(started.elapsed() < Duration::from_secs(10));

    let job = world.registry.get_job(&TENANT.into(), &"job-1".into()).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_message.as_deref(), Some("cancelled"));
    assert!(job.completed_at.is_some());
}
