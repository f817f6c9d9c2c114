// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime events the pipeline publishes and the hub fans out.
//!
//! Serializes with `{"type": "job_progress", ...fields}` format, the same
//! envelope the WebSocket wire protocol delivers to clients, so the hub can
//! marshal an event once and enqueue the bytes everywhere.

use crate::entry::LogEntry;
use crate::job::{AnalysisJob, JobId, JobStatus};
use crate::tenant::TenantId;
use crate::topic::Topic;
use serde::{Deserialize, Serialize};

/// Events published over the broker. Delivery is at-most-once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Progress checkpoint for a running job.
    JobProgress {
        tenant_id: TenantId,
        job_id: JobId,
        progress_pct: u8,
        status: JobStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Terminal snapshot; the last event any subscriber sees for a job.
    JobComplete {
        tenant_id: TenantId,
        job_id: JobId,
        job: Box<AnalysisJob>,
    },

    /// One parsed entry streamed during raw-log ingestion.
    LiveTailEntry {
        tenant_id: TenantId,
        job_id: JobId,
        entry: Box<LogEntry>,
    },
}

impl Event {
    /// The topic this event is published under.
    pub fn topic(&self) -> Topic {
        match self {
            Event::JobProgress { tenant_id, job_id, .. } => {
                Topic::job_progress(tenant_id, job_id)
            }
            Event::JobComplete { tenant_id, job_id, .. } => {
                Topic::job_complete(tenant_id, job_id)
            }
            Event::LiveTailEntry { tenant_id, entry, .. } => {
                Topic::live_tail(tenant_id, entry.log_type())
            }
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        match self {
            Event::JobProgress { tenant_id, .. }
            | Event::JobComplete { tenant_id, .. }
            | Event::LiveTailEntry { tenant_id, .. } => tenant_id,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
