// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Columnar log-entry store contract.

use crate::error::StoreError;
use async_trait::async_trait;
use loupe_core::LogEntry;

/// Upper bound on rows per insert call.
pub const MAX_BATCH_ROWS: usize = 10_000;

/// Append-only columnar store for parsed log entries, keyed by
/// `(tenant_id, job_id, entry_id)` and ordered for range scans on
/// `(tenant_id, job_id, log_type, timestamp, line_number)`.
#[async_trait]
pub trait ColumnarLogStore: Send + Sync {
    /// Insert a batch of up to [`MAX_BATCH_ROWS`] entries.
    ///
    /// The batch succeeds or fails as a unit; a duplicate `line_number`
    /// within a job rejects the whole batch with [`StoreError::Conflict`].
    async fn batch_insert_entries(&self, entries: &[LogEntry]) -> Result<(), StoreError>;
}
