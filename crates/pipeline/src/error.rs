// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fatal pipeline errors.
//!
//! Anything that reaches this enum fails the job; best-effort steps (cache
//! writes, anomaly detection, raw ingestion) log and swallow their errors
//! before they get here.

use loupe_analysis::{ParseError, RunnerError};
use loupe_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Staging the download to a temp file failed.
    #[error("staging failed: {0}")]
    Staging(String),

    /// The driving context was cancelled between steps.
    #[error("cancelled")]
    Cancelled,
}

impl PipelineError {
    /// The message recorded on the failed job and published to subscribers.
    pub fn job_message(&self) -> String {
        match self {
            PipelineError::Cancelled | PipelineError::Runner(RunnerError::Cancelled) => {
                "cancelled".to_string()
            }
            other => other.to_string(),
        }
    }
}
