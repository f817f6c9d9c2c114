// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relational job registry contract.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loupe_core::file::FileId;
use loupe_core::job::{AnalysisJob, JobId, JobStatus};
use loupe_core::{LogFile, TenantId};

/// Per-type counts and the log window, persisted once at completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSummary {
    pub api_count: u64,
    pub sql_count: u64,
    pub filter_count: u64,
    pub escalation_count: u64,
    pub processed_lines: Option<u64>,
    pub log_start: Option<DateTime<Utc>>,
    pub log_end: Option<DateTime<Utc>>,
    pub log_duration_ms: Option<u64>,
}

/// The job registry owns `AnalysisJob` and `LogFile` rows, keyed by
/// `(tenant_id, id)`.
///
/// Status transitions are monotonic: an update that would move a job
/// backward (or out of a terminal state) fails with [`StoreError::Conflict`].
#[async_trait]
pub trait JobRegistry: Send + Sync {
    /// Fetch a job row.
    async fn get_job(&self, tenant: &TenantId, job: &JobId) -> Result<AnalysisJob, StoreError>;

    /// Fetch a log-file row.
    async fn get_log_file(&self, tenant: &TenantId, file: &FileId)
        -> Result<LogFile, StoreError>;

    /// Persist a status transition; `error` is recorded for `Failed`.
    async fn update_job_status(
        &self,
        tenant: &TenantId,
        job: &JobId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Persist a progress checkpoint.
    async fn update_job_progress(
        &self,
        tenant: &TenantId,
        job: &JobId,
        progress_pct: u8,
        processed_lines: Option<u64>,
    ) -> Result<(), StoreError>;

    /// Persist per-type counts and the log window.
    async fn record_job_summary(
        &self,
        tenant: &TenantId,
        job: &JobId,
        summary: &JobSummary,
    ) -> Result<(), StoreError>;
}
