// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory job registry.

use crate::error::StoreError;
use crate::registry::{JobRegistry, JobSummary};
use async_trait::async_trait;
use loupe_core::file::FileId;
use loupe_core::job::{AnalysisJob, JobId, JobStatus};
use loupe_core::{Clock, LogFile, SystemClock, TenantId};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Job and log-file rows held in process memory.
pub struct MemoryRegistry<C: Clock = SystemClock> {
    jobs: Mutex<HashMap<(TenantId, JobId), AnalysisJob>>,
    files: Mutex<HashMap<(TenantId, FileId), LogFile>>,
    clock: C,
}

impl MemoryRegistry<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryRegistry<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { jobs: Mutex::new(HashMap::new()), files: Mutex::new(HashMap::new()), clock }
    }

    /// Seed a job row (the create path lives outside the core).
    pub fn insert_job(&self, job: AnalysisJob) {
        self.jobs.lock().insert((job.tenant_id.clone(), job.id.clone()), job);
    }

    /// Seed a log-file row.
    pub fn insert_file(&self, file: LogFile) {
        self.files.lock().insert((file.tenant_id.clone(), file.id.clone()), file);
    }

    fn with_job<T>(
        &self,
        tenant: &TenantId,
        job: &JobId,
        f: impl FnOnce(&mut AnalysisJob) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut jobs = self.jobs.lock();
        match jobs.get_mut(&(tenant.clone(), job.clone())) {
            Some(row) => f(row),
            None => Err(StoreError::NotFound(format!("job {tenant}/{job}"))),
        }
    }
}

#[async_trait]
impl<C: Clock + 'static> JobRegistry for MemoryRegistry<C> {
    async fn get_job(&self, tenant: &TenantId, job: &JobId) -> Result<AnalysisJob, StoreError> {
        self.jobs
            .lock()
            .get(&(tenant.clone(), job.clone()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("job {tenant}/{job}")))
    }

    async fn get_log_file(
        &self,
        tenant: &TenantId,
        file: &FileId,
    ) -> Result<LogFile, StoreError> {
        self.files
            .lock()
            .get(&(tenant.clone(), file.clone()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("file {tenant}/{file}")))
    }

    async fn update_job_status(
        &self,
        tenant: &TenantId,
        job: &JobId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<(), StoreError> {
        let now = self.clock.now_utc();
        self.with_job(tenant, job, |row| {
            if !row.status.can_transition_to(status) {
                return Err(StoreError::Conflict(format!(
                    "job {}/{} cannot move {} -> {}",
                    tenant, job, row.status, status
                )));
            }
            row.status = status;
            row.error_message = error.map(str::to_string);
            if status.is_terminal() {
                row.completed_at = Some(now);
            }
            Ok(())
        })
    }

    async fn update_job_progress(
        &self,
        tenant: &TenantId,
        job: &JobId,
        progress_pct: u8,
        processed_lines: Option<u64>,
    ) -> Result<(), StoreError> {
        self.with_job(tenant, job, |row| {
            row.progress_pct = progress_pct.min(100);
            if processed_lines.is_some() {
                row.processed_lines = processed_lines;
            }
            Ok(())
        })
    }

    async fn record_job_summary(
        &self,
        tenant: &TenantId,
        job: &JobId,
        summary: &JobSummary,
    ) -> Result<(), StoreError> {
        self.with_job(tenant, job, |row| {
            row.api_count = summary.api_count;
            row.sql_count = summary.sql_count;
            row.filter_count = summary.filter_count;
            row.escalation_count = summary.escalation_count;
            if summary.processed_lines.is_some() {
                row.processed_lines = summary.processed_lines;
            }
            row.log_start = summary.log_start;
            row.log_end = summary.log_end;
            row.log_duration_ms = summary.log_duration_ms;
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
