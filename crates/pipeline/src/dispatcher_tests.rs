// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use loupe_core::job::{AnalysisJob, JobStatus, JobSubmission};
use loupe_core::test_support::{sample_report, SAMPLE_RAW_LOG};
use loupe_core::FakeClock;
use loupe_analysis::AnalyzerRunner;
use loupe_store::{
    JobRegistry, MemoryBroker, MemoryCache, MemoryLogStore, MemoryObjectStore, MemoryRegistry,
};
use crate::orchestrator::{OrchestratorConfig, Stores};
use sha2::{Digest, Sha256};
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;
use tempfile::TempDir;

struct Rig {
    broker: Arc<MemoryBroker>,
    registry: Arc<MemoryRegistry<FakeClock>>,
    dispatcher: Dispatcher<FakeClock>,
    _dir: TempDir,
}

fn rig(job_ids: &[&str]) -> Rig {
    let dir = TempDir::new().unwrap();
    let bin = dir.path().join("analyzer.sh");
    std::fs::write(
        &bin,
        format!("#!/bin/sh\ncat <<'REPORT_EOF'\n{}\nREPORT_EOF\n", sample_report()),
    )
    .unwrap();
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

    let clock = FakeClock::new();
    let registry = Arc::new(MemoryRegistry::with_clock(clock.clone()));
    let broker = Arc::new(MemoryBroker::new());

    let checksum = format!("{:x}", Sha256::digest(SAMPLE_RAW_LOG.as_bytes()));
    let objects = Arc::new(MemoryObjectStore::new());
    objects.put("blobs/file-1", SAMPLE_RAW_LOG.as_bytes().to_vec());
    registry.insert_file(loupe_core::LogFile {
        id: "file-1".into(),
        tenant_id: "acme".into(),
        blob_key: "blobs/file-1".to_string(),
        size_bytes: SAMPLE_RAW_LOG.len() as u64,
        checksum,
    });
    for id in job_ids {
        registry.insert_job(AnalysisJob::builder().id(*id).tenant_id("acme").build());
    }

    let stores = Stores {
        registry: registry.clone(),
        log_store: Arc::new(MemoryLogStore::new()),
        objects,
        cache: Arc::new(MemoryCache::with_clock(clock.clone())),
        broker: broker.clone(),
    };
    let orchestrator = Arc::new(Orchestrator::with_clock(
        stores,
        AnalyzerRunner::new(bin, 512, Duration::from_secs(10)),
        OrchestratorConfig::default(),
        clock,
    ));
    let dispatcher = Dispatcher::new("acme".into(), broker.clone(), orchestrator);

    Rig { broker, registry, dispatcher, _dir: dir }
}

fn submission(job_id: &str) -> JobSubmission {
    JobSubmission { tenant_id: "acme".into(), job_id: job_id.into() }
}

#[tokio::test]
async fn processes_submissions_serially() {
    let Rig { broker, registry, dispatcher, _dir } = rig(&["job-1", "job-2"]);
    let token = CancellationToken::new();

    let loop_token = token.clone();
    let handle = tokio::spawn(async move {
        // The dispatcher subscribes inside start(); submissions sent after
        // that are delivered in order.
        dispatcher.start(loop_token).await
    });

    // Wait for the subscription to exist, then feed two jobs.
    for _ in 0..100 {
        if broker.submit_job(submission("job-1")).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    broker.submit_job(submission("job-2")).await.unwrap();

    // Both jobs reach a terminal state.
    for _ in 0..200 {
        let done = registry
            .get_job(&"acme".into(), &"job-2".into())
            .await
            .map(|j| j.status == JobStatus::Complete)
            .unwrap_or(false);
        if done {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(
        registry.get_job(&"acme".into(), &"job-1".into()).await.unwrap().status,
        JobStatus::Complete
    );
    assert_eq!(
        registry.get_job(&"acme".into(), &"job-2".into()).await.unwrap().status,
        JobStatus::Complete
    );

    token.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn resubmission_after_completion_is_delivered_but_harmless() {
    let Rig { broker, registry, dispatcher, _dir } = rig(&["job-1"]);
    let token = CancellationToken::new();

    let loop_token = token.clone();
    let handle = tokio::spawn(async move { dispatcher.start(loop_token).await });

    for _ in 0..100 {
        if broker.submit_job(submission("job-1")).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    for _ in 0..200 {
        if registry
            .get_job(&"acme".into(), &"job-1".into())
            .await
            .map(|j| j.status == JobStatus::Complete)
            .unwrap_or(false)
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    // The in-flight window has closed, so a resubmission is not dropped:
    // it reaches the orchestrator, which runs into the registry's terminal
    // state and leaves the completed row untouched.
    let first_completes = complete_snapshots(&broker);
    assert_eq!(first_completes, 1);
    broker.submit_job(submission("job-1")).await.unwrap();

    for _ in 0..200 {
        if complete_snapshots(&broker) > first_completes {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    let job = registry.get_job(&"acme".into(), &"job-1".into()).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert!(job.error_message.is_none());

    // Every snapshot published for this job still carries the completed row.
    for event in broker.events() {
        if let loupe_core::Event::JobComplete { job, .. } = event {
            assert_eq!(job.status, JobStatus::Complete);
        }
    }

    token.cancel();
    handle.await.unwrap().unwrap();
}

fn complete_snapshots(broker: &MemoryBroker) -> usize {
    broker
        .events()
        .into_iter()
        .filter(|e| matches!(e, loupe_core::Event::JobComplete { .. }))
        .count()
}

#[tokio::test]
async fn cancellation_stops_the_loop() {
    let Rig { broker: _broker, registry: _registry, dispatcher, _dir } = rig(&[]);
    let token = CancellationToken::new();

    let loop_token = token.clone();
    let handle = tokio::spawn(async move { dispatcher.start(loop_token).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(2), handle).await;
    assert!(outcome.unwrap().unwrap().is_ok());
}
