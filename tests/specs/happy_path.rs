// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: a clean run end to end.
//!
//! A subscribed client watches the job move queued → … → complete, the
//! columnar store receives every parsed entry, and the crafted ≈4.2σ
//! outlier surfaces as a single high-severity anomaly.

use super::prelude::*;
use loupe_core::job::JobStatus;
use loupe_hub::HubConfig;

#[tokio::test]
async fn progress_then_complete_over_websocket() {
    let world = World::new(
        HubConfig::default(),
        &report_with_outlier(),
        &raw_log_with_50_apis(),
    );
    let mut client = world.connect(TENANT).await;
    client.subscribe_job_progress("job-1").await;

    world.process_job().await;

    let frames = client.collect_until(|f| f["type"] == "job_complete").await;

    // Progress percentages climb through the documented checkpoints.
    let pcts: Vec<u64> = frames
        .iter()
        .filter(|f| f["type"] == "job_progress")
        .map(|f| f["progress_pct"].as_u64().unwrap())
        .collect();
    assert_eq!(pcts, vec![5, 15, 75, 85, 95, 100]);

    // The last frame is the terminal snapshot (I2).
    let last = frames.last().unwrap();
    assert_eq!(last["type"], "job_complete");
    assert_eq!(last["job"]["status"], "complete");
    assert_eq!(last["job"]["api_count"], 50);
    assert!(last["job"]["error_message"].is_null());
}

#[tokio::test]
async fn entries_land_in_the_columnar_store() {
    let world = World::new(
        HubConfig::default(),
        &report_with_outlier(),
        &raw_log_with_50_apis(),
    );
    world.process_job().await;

    let rows = world.log_store.rows_for_job(&TENANT.into(), &"job-1".into());
    assert_eq!(rows.len(), 51);
    assert_eq!(rows.iter().filter(|r| r.log_type() == loupe_core::LogType::Api).count(), 50);

    // Line numbers are unique within the job (I3 companion invariant).
    let mut lines: Vec<u64> = rows.iter().map(|r| r.line_number).collect();
    lines.sort_unstable();
    lines.dedup();
    assert_eq!(lines.len(), 51);
}

#[tokio::test]
async fn outlier_becomes_one_high_severity_anomaly() {
    let world = World::new(
        HubConfig::default(),
        &report_with_outlier(),
        &raw_log_with_50_apis(),
    );
    world.process_job().await;

    let dashboard = world.cache.get("cache:acme:dashboard:job-1").expect("cached dashboard");
    let anomalies = dashboard["anomalies"].as_array().unwrap();
    assert_eq!(anomalies.len(), 1);

    let anomaly = &anomalies[0];
    assert_eq!(anomaly["metric"], "HPD:Help Desk");
    assert_eq!(anomaly["severity"], "high");
    assert_eq!(anomaly["kind"], "api_latency");
    let sigma = anomaly["sigma"].as_f64().unwrap();
    assert!((4.0..4.5).contains(&sigma), "sigma was {sigma}");
}

#[tokio::test]
async fn registry_row_reaches_complete_with_summary() {
    let world = World::new(
        HubConfig::default(),
        &report_with_outlier(),
        &raw_log_with_50_apis(),
    );
    world.process_job().await;

    let job = world.registry.get_job(&TENANT.into(), &"job-1".into()).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.progress_pct, 100);
    assert_eq!(job.api_count, 50);
    assert_eq!(job.processed_lines, Some(51));
    assert!(job.completed_at.is_some());
    assert!(job.log_duration_ms.is_some());
}
