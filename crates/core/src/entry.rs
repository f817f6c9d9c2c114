// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed log entries.
//!
//! One [`LogEntry`] per classified raw log line: a shared header (identity,
//! timing, attribution) plus a [`EntryDetail`] payload specific to the line's
//! [`LogType`].

use crate::id::EntryId;
use crate::job::JobId;
use crate::tenant::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of AR-Server log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogType {
    Api,
    Sql,
    Fltr,
    Escl,
}

impl LogType {
    pub const ALL: [LogType; 4] = [LogType::Api, LogType::Sql, LogType::Fltr, LogType::Escl];
}

crate::display_parse! {
    LogType {
        Api => "API",
        Sql => "SQL",
        Fltr => "FLTR",
        Escl => "ESCL",
    }
}

/// Variant-specific payload of a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryDetail {
    /// API call against a form.
    Api {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        form: Option<String>,
    },
    /// SQL statement against a table.
    Sql {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<String>,
    },
    /// Filter execution.
    Filter {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },
    /// Escalation run.
    Escalation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool: Option<String>,
    },
}

impl EntryDetail {
    /// The log type this payload belongs to.
    pub fn log_type(&self) -> LogType {
        match self {
            EntryDetail::Api { .. } => LogType::Api,
            EntryDetail::Sql { .. } => LogType::Sql,
            EntryDetail::Filter { .. } => LogType::Fltr,
            EntryDetail::Escalation { .. } => LogType::Escl,
        }
    }

    /// The identifier this entry aggregates under (form, table, or name).
    pub fn identifier(&self) -> Option<&str> {
        match self {
            EntryDetail::Api { form } => form.as_deref(),
            EntryDetail::Sql { table } => table.as_deref(),
            EntryDetail::Filter { name, .. } => name.as_deref(),
            EntryDetail::Escalation { name, .. } => name.as_deref(),
        }
    }
}

/// One parsed log line.
///
/// `line_number` is unique within a job. `timestamp` is monotonic
/// non-decreasing within a `thread_id` except for observed clock skew,
/// which is tolerated rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub tenant_id: TenantId,
    pub job_id: JobId,
    pub line_number: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub success: bool,
    #[serde(flatten)]
    pub detail: EntryDetail,
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEntry {
    pub fn log_type(&self) -> LogType {
        self.detail.log_type()
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
