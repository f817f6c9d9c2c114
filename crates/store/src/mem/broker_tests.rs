// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn submissions_flow_to_subscriber() {
    let broker = MemoryBroker::new();
    let tenant = TenantId::new("acme");
    let mut rx = broker.subscribe_job_submit(&tenant).await.unwrap();

    let submission = JobSubmission { tenant_id: tenant.clone(), job_id: "job-1".into() };
    broker.submit_job(submission.clone()).await.unwrap();

    assert_eq!(rx.recv().await, Some(submission));
}

#[tokio::test]
async fn submit_without_subscriber_is_closed() {
    let broker = MemoryBroker::new();
    let submission = JobSubmission { tenant_id: "acme".into(), job_id: "job-1".into() };
    let err = broker.submit_job(submission).await.unwrap_err();
    assert!(matches!(err, BrokerError::Closed(_)));
}

#[tokio::test]
async fn publishes_are_recorded_in_order() {
    let broker = MemoryBroker::new();
    let tenant = TenantId::new("acme");
    let job = JobId::new("job-1");

    broker
        .publish_job_progress(&tenant, &job, 5, JobStatus::Parsing, None)
        .await
        .unwrap();
    broker
        .publish_job_progress(&tenant, &job, 15, JobStatus::Analyzing, None)
        .await
        .unwrap();

    let events = broker.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Event::JobProgress { progress_pct: 5, .. }));
    assert!(matches!(events[1], Event::JobProgress { progress_pct: 15, .. }));
}

#[tokio::test]
async fn events_for_topic_filters_by_tenant() {
    let broker = MemoryBroker::new();
    let job = JobId::new("job-1");
    broker
        .publish_job_progress(&"a".into(), &job, 5, JobStatus::Parsing, None)
        .await
        .unwrap();
    broker
        .publish_job_progress(&"b".into(), &job, 5, JobStatus::Parsing, None)
        .await
        .unwrap();

    let topic = Topic::job_progress(&"a".into(), &job);
    assert_eq!(broker.events_for_topic(&topic).len(), 1);
}
