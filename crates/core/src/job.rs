// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Analysis job identity and state machine.

use crate::tenant::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for an analysis job, assigned when the job is created
    /// (outside the core). Unique within a tenant.
    pub struct JobId;
}

/// Status of an analysis job.
///
/// The lifecycle is linear: `Queued → Parsing → Analyzing → Storing →
/// Complete`, with `Failed` reachable from any non-terminal state.
/// Transitions never move backward; [`JobStatus::can_transition_to`] is the
/// single source of truth the registry enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Parsing,
    Analyzing,
    Storing,
    Complete,
    Failed,
}

impl JobStatus {
    /// Position in the forward lifecycle. `Failed` ranks above everything
    /// so that no transition out of it is ever legal.
    fn rank(self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Parsing => 1,
            JobStatus::Analyzing => 2,
            JobStatus::Storing => 3,
            JobStatus::Complete => 4,
            JobStatus::Failed => 5,
        }
    }

    /// Check whether moving from `self` to `next` is a legal forward step.
    ///
    /// `Failed` is reachable from any non-terminal state; terminal states
    /// (`Complete`, `Failed`) admit no further transitions.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobStatus::Failed {
            return true;
        }
        next.rank() > self.rank()
    }

    /// Check if this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }
}

crate::display_parse! {
    JobStatus {
        Queued => "queued",
        Parsing => "parsing",
        Analyzing => "analyzing",
        Storing => "storing",
        Complete => "complete",
        Failed => "failed",
    }
}

/// Switches forwarded to the external analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerFlags {
    /// Analyze API calls.
    #[serde(default)]
    pub api: bool,
    /// Analyze SQL statements.
    #[serde(default)]
    pub sql: bool,
    /// Analyze filter executions.
    #[serde(default)]
    pub filters: bool,
    /// Analyze escalations.
    #[serde(default)]
    pub escalations: bool,
    /// Emit thread statistics.
    #[serde(default)]
    pub threads: bool,
}

impl AnalyzerFlags {
    /// Flags with every analysis pass enabled.
    pub fn all() -> Self {
        Self { api: true, sql: true, filters: true, escalations: true, threads: true }
    }
}

/// One log-analysis job.
///
/// Identity is `(tenant_id, id)`. Created externally in `Queued` status;
/// owned by the orchestrator while processing; terminal in `Complete` or
/// `Failed` with no resurrection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: JobId,
    pub tenant_id: TenantId,
    /// The uploaded log file this job analyzes.
    pub file_id: crate::file::FileId,
    pub status: JobStatus,
    /// Progress through the pipeline, 0..=100.
    pub progress_pct: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_lines: Option<u64>,
    #[serde(default)]
    pub api_count: u64,
    #[serde(default)]
    pub sql_count: u64,
    #[serde(default)]
    pub filter_count: u64,
    #[serde(default)]
    pub escalation_count: u64,
    /// Earliest timestamp observed in the log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_start: Option<DateTime<Utc>>,
    /// Latest timestamp observed in the log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub flags: AnalyzerFlags,
    /// Heap hint forwarded to the analyzer child, in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heap_mb: Option<u32>,
    /// Hard upper bound on analyzer runtime, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl AnalysisJob {
    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A request to process one job, delivered over the broker submit subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSubmission {
    pub tenant_id: TenantId,
    pub job_id: JobId,
}

crate::builder! {
    pub struct AnalysisJobBuilder => AnalysisJob {
        into {
            id: JobId = "job-1",
            tenant_id: TenantId = "acme",
            file_id: crate::file::FileId = "file-1",
            status: JobStatus = JobStatus::Queued,
            progress_pct: u8 = 0u8,
            api_count: u64 = 0u64,
            sql_count: u64 = 0u64,
            filter_count: u64 = 0u64,
            escalation_count: u64 = 0u64,
            flags: AnalyzerFlags = AnalyzerFlags::all(),
        }
        option {
            processed_lines: u64 = None,
            log_start: DateTime<Utc> = None,
            log_end: DateTime<Utc> = None,
            log_duration_ms: u64 = None,
            error_message: String = None,
            completed_at: DateTime<Utc> = None,
            heap_mb: u32 = None,
            timeout_secs: u64 = None,
        }
        computed {
            created_at: DateTime<Utc> = DateTime::<Utc>::default(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
