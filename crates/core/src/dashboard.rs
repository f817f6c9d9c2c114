// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard data derived from one analyzed log file.
//!
//! Computed once per job at ingestion, cached per section, and invalidated
//! only when the job is recomputed.

use crate::entry::LogType;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Headline counters for a log file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_lines: u64,
    #[serde(default)]
    pub api_count: u64,
    #[serde(default)]
    pub sql_count: u64,
    #[serde(default)]
    pub filter_count: u64,
    #[serde(default)]
    pub escalation_count: u64,
    #[serde(default)]
    pub error_count: u64,
}

impl GeneralStatistics {
    /// Span covered by the log, when both endpoints were observed.
    pub fn log_duration_ms(&self) -> Option<u64> {
        match (self.log_start, self.log_end) {
            (Some(start), Some(end)) if end >= start => {
                Some((end - start).num_milliseconds() as u64)
            }
            _ => None,
        }
    }

    /// Count of entries of the given type.
    pub fn count_for(&self, log_type: LogType) -> u64 {
        match log_type {
            LogType::Api => self.api_count,
            LogType::Sql => self.sql_count,
            LogType::Fltr => self.filter_count,
            LogType::Escl => self.escalation_count,
        }
    }
}

/// A row in an analyzer-produced leaderboard (slow API, slow SQL, heavy
/// filter, busy escalation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopEntry {
    pub rank: u32,
    /// Form (API), table (SQL), or definition name (filter/escalation).
    pub identifier: String,
    pub count: u64,
    pub total_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub avg_ms: f64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Bucket width of a time-series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Second,
    Minute,
}

crate::display_parse! {
    Granularity {
        Second => "second",
        Minute => "minute",
    }
}

/// One time-series bucket of activity counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesBucket {
    pub bucket: DateTime<Utc>,
    pub granularity: Granularity,
    #[serde(default)]
    pub api_count: u64,
    #[serde(default)]
    pub sql_count: u64,
    #[serde(default)]
    pub filter_count: u64,
    #[serde(default)]
    pub escalation_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub avg_duration_ms: f64,
}

/// Count distributions over the log, keyed by the dimension value.
///
/// Insertion order is preserved so cached sections render stably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distributions {
    #[serde(default)]
    pub by_type: IndexMap<String, u64>,
    #[serde(default)]
    pub by_form: IndexMap<String, u64>,
    #[serde(default)]
    pub by_table: IndexMap<String, u64>,
    #[serde(default)]
    pub by_queue: IndexMap<String, u64>,
    #[serde(default)]
    pub by_user: IndexMap<String, u64>,
    /// Error message → occurrence count; the source for derived exceptions.
    #[serde(default)]
    pub errors: IndexMap<String, u64>,
}

impl Distributions {
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
            && self.by_form.is_empty()
            && self.by_table.is_empty()
            && self.by_queue.is_empty()
            && self.by_user.is_empty()
    }
}

/// Everything the dashboard renders for one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub statistics: GeneralStatistics,
    #[serde(default)]
    pub slow_apis: Vec<TopEntry>,
    #[serde(default)]
    pub slow_sql: Vec<TopEntry>,
    #[serde(default)]
    pub top_filters: Vec<TopEntry>,
    #[serde(default)]
    pub top_escalations: Vec<TopEntry>,
    #[serde(default)]
    pub timeseries: Vec<TimeseriesBucket>,
    #[serde(default)]
    pub distributions: Distributions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,
}

impl DashboardData {
    /// The top-N list for a log type.
    pub fn top_list(&self, log_type: LogType) -> &[TopEntry] {
        match log_type {
            LogType::Api => &self.slow_apis,
            LogType::Sql => &self.slow_sql,
            LogType::Fltr => &self.top_filters,
            LogType::Escl => &self.top_escalations,
        }
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
