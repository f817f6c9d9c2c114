// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: a tenant-A client subscribes to a tenant-B topic string.
//!
//! The hub stores the subscription (topics are opaque to it), but
//! publishers always construct topics from the originating tenant, so
//! nothing tenant-B produces ever reaches tenant-A through tenant-A's
//! pipeline, and tenant-A's pipeline never publishes under tenant-B's key.

use super::prelude::*;
use loupe_core::Topic;
use loupe_hub::HubConfig;
use std::time::Duration;

#[tokio::test]
async fn cross_tenant_subscription_receives_nothing_from_home_pipeline() {
    let world = World::new(
        HubConfig::default(),
        &report_with_outlier(),
        &raw_log_with_50_apis(),
    );

    // Client of tenant-a manually subscribes to acme's progress topic via
    // the hub. The session API would scope it to tenant-a, so go direct;
    // the hub accepts any opaque string.
    let intruder = world.connect("tenant-a").await;
    world
        .hub
        .subscribe(
            &intruder.hub_client,
            Topic::from("job_progress.tenant-b.job-1"),
        )
        .unwrap();

    // Session-level subscribes are tenant-scoped by construction.
    let mut intruder = intruder;
    intruder.subscribe_job_progress("job-1").await;
    assert!(intruder
        .hub_client
        .is_subscribed(&Topic::from("job_progress.tenant-a.job-1")));
    assert!(!intruder
        .hub_client
        .is_subscribed(&Topic::from("job_progress.acme.job-1")));

    // Run acme's pipeline to completion; acme publishes only under acme.
    world.process_job().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(
        intruder.hub_client.queue().is_empty(),
        "cross-tenant client observed another tenant's events"
    );
}
