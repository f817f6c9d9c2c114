// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Derived records the enhancer produces when the analyzer did not.

use crate::entry::LogType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier the grand-total aggregate row uses.
pub const GRAND_TOTAL: &str = "Grand Total";

/// Per-identifier aggregate: form for API, table for SQL, definition name
/// for filters and escalations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_type: Option<LogType>,
    pub identifier: String,
    pub count: u64,
    pub total_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub avg_ms: f64,
    #[serde(default)]
    pub error_count: u64,
    /// Errors as a fraction of calls, 0..=100.
    #[serde(default)]
    pub error_rate_pct: f64,
    #[serde(default)]
    pub unique_traces: u64,
}

/// An error message with its frequency, derived from the error distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub message: String,
    pub count: u64,
    /// Occurrences as a fraction of API calls, 0..=100.
    #[serde(default)]
    pub rate_pct: f64,
}

/// Activity attributed to one server thread.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadStat {
    pub thread_id: String,
    #[serde(default)]
    pub api_count: u64,
    #[serde(default)]
    pub sql_count: u64,
    #[serde(default)]
    pub total_ms: u64,
    /// Distinct traces observed on this thread.
    #[serde(default)]
    pub trace_count: u64,
}

/// One filter definition's execution summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterStat {
    pub name: String,
    pub count: u64,
    pub total_ms: u64,
    pub avg_ms: f64,
}

/// Filters attributed to one transaction (trace).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilters {
    pub trace_id: String,
    pub filter_count: u64,
    pub total_ms: u64,
}

/// Filter analysis: the most-executed leaderboard plus a per-transaction
/// slice capped at 100 rows, sorted by total time descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterAnalysis {
    #[serde(default)]
    pub most_executed: Vec<FilterStat>,
    #[serde(default)]
    pub per_transaction: Vec<TransactionFilters>,
}

/// Per-queue latency summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueHealth {
    pub queue: String,
    pub call_count: u64,
    pub avg_duration_ms: f64,
    /// 95th-percentile call duration.
    pub p95_duration_ms: u64,
    #[serde(default)]
    pub error_count: u64,
}

/// A call observed waiting on a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedCall {
    pub queue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_id: Option<String>,
    pub wait_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Logging volume for one labelled slice of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingActivity {
    pub label: String,
    pub line_count: u64,
}

/// Metadata the analyzer reports about the file itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub line_count: u64,
    #[serde(default)]
    pub log_types: Vec<LogType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_end: Option<DateTime<Utc>>,
}
