// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory columnar log store.

use crate::columnar::{ColumnarLogStore, MAX_BATCH_ROWS};
use crate::error::StoreError;
use async_trait::async_trait;
use loupe_core::job::JobId;
use loupe_core::{LogEntry, TenantId};
use parking_lot::Mutex;
use std::collections::HashSet;

/// Parsed entries held in insertion order, with per-job line uniqueness.
#[derive(Default)]
pub struct MemoryLogStore {
    rows: Mutex<Vec<LogEntry>>,
    seen_lines: Mutex<HashSet<(TenantId, JobId, u64)>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows inserted so far, for assertions.
    pub fn rows(&self) -> Vec<LogEntry> {
        self.rows.lock().clone()
    }

    /// Rows belonging to one job.
    pub fn rows_for_job(&self, tenant: &TenantId, job: &JobId) -> Vec<LogEntry> {
        self.rows
            .lock()
            .iter()
            .filter(|e| &e.tenant_id == tenant && &e.job_id == job)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ColumnarLogStore for MemoryLogStore {
    async fn batch_insert_entries(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        if entries.len() > MAX_BATCH_ROWS {
            return Err(StoreError::BatchTooLarge { got: entries.len(), max: MAX_BATCH_ROWS });
        }

        // Validate the whole batch before touching the table: one error
        // rejects the entire batch.
        let mut seen = self.seen_lines.lock();
        let mut batch_lines = HashSet::new();
        for entry in entries {
            let key = (entry.tenant_id.clone(), entry.job_id.clone(), entry.line_number);
            if seen.contains(&key) || !batch_lines.insert(key.clone()) {
                return Err(StoreError::Conflict(format!(
                    "duplicate line {} for job {}/{}",
                    entry.line_number, entry.tenant_id, entry.job_id
                )));
            }
        }

        seen.extend(batch_lines);
        self.rows.lock().extend_from_slice(entries);
        Ok(())
    }
}

#[cfg(test)]
#[path = "columnar_tests.rs"]
mod tests;
