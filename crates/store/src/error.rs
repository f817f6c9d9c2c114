// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by store backends.

use thiserror::Error;

/// Errors from registry, columnar and object-store operations.
///
/// The orchestrator decides fatal vs. degraded: a `StoreError` from a
/// best-effort step is logged and swallowed, anywhere else it fails the job.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed job, file, or blob does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation conflicts with persisted state (backward status
    /// transition, duplicate line number).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A batch exceeded the per-call row bound.
    #[error("batch of {got} rows exceeds maximum of {max}")]
    BatchTooLarge { got: usize, max: usize },

    /// Downloaded bytes did not match the recorded checksum.
    #[error("integrity check failed for {blob_key}: {detail}")]
    Integrity { blob_key: String, detail: String },

    /// Backend I/O failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(e: impl std::fmt::Display) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Errors from cache operations. Always logged and ignored; never fatal.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}
