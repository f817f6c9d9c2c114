// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker contract: realtime event publication and job-submission intake.

use async_trait::async_trait;
use loupe_core::job::{AnalysisJob, JobId, JobStatus, JobSubmission};
use loupe_core::{LogEntry, TenantId};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from broker operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The subject or connection is gone.
    #[error("broker subject closed: {0}")]
    Closed(String),

    #[error("broker backend error: {0}")]
    Backend(String),
}

/// At-most-once event publication plus the job-submission subject.
///
/// Publishers construct topics from the originating tenant, so a publish can
/// never cross tenants. Submissions arrive over a channel rather than a
/// callback; the dispatcher drains it serially so broker-level flow control
/// applies.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn publish_job_progress(
        &self,
        tenant: &TenantId,
        job: &JobId,
        progress_pct: u8,
        status: JobStatus,
        message: Option<String>,
    ) -> Result<(), BrokerError>;

    /// Publish the terminal snapshot for a job.
    async fn publish_job_complete(&self, job: &AnalysisJob) -> Result<(), BrokerError>;

    /// Publish one parsed entry on the tenant's live-tail topic.
    async fn publish_live_tail(&self, entry: &LogEntry) -> Result<(), BrokerError>;

    /// Open the submission subject for a tenant.
    async fn subscribe_job_submit(
        &self,
        tenant: &TenantId,
    ) -> Result<mpsc::Receiver<JobSubmission>, BrokerError>;
}
