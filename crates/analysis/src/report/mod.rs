// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Analyzer report parser.
//!
//! The analyzer prints a sectioned text report on stdout:
//!
//! ```text
//! === General Statistics ===
//! log_start: 2025-06-10 11:20:16.220
//! api_count: 50
//!
//! === Slow API Calls ===
//! rank | identifier | count | total_ms | min_ms | max_ms | avg_ms | errors | trace_id | thread_id | queue | user
//! 1 | HPD:Help Desk | 12 | 5400 | 100 | 2100 | 450.0 | 1 | a1 | 336 | Fast | Demo
//! ```
//!
//! Key/value sections use `key: value` lines; tabular sections use a
//! pipe-delimited header row followed by data rows. Unknown sections are
//! preserved verbatim. The parser performs no I/O.

mod sections;
mod stats;
mod tables;

use loupe_core::{
    Aggregate, DashboardData, ExceptionRecord, FileMetadata, FilterAnalysis, LoggingActivity,
    QueueHealth, QueuedCall, ThreadStat,
};

use indexmap::IndexMap;
use sections::split_sections;
use thiserror::Error;

/// A malformed report. Names the offending section and the 1-based line
/// offset within the report.
#[derive(Debug, Error)]
#[error("parse error in section '{section}' at line {line}: {detail}")]
pub struct ParseError {
    pub section: String,
    pub line: usize,
    pub detail: String,
}

impl ParseError {
    pub(crate) fn new(section: &str, line: usize, detail: impl Into<String>) -> Self {
        Self { section: section.to_string(), line, detail: detail.into() }
    }

    fn empty() -> Self {
        Self::new("<report>", 0, "empty analyzer output")
    }
}

/// Structured view of one analyzer report.
///
/// Sections the analyzer did not emit stay `None`/empty; the enhancer
/// derives them afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    pub dashboard: DashboardData,
    pub aggregates: Option<Vec<Aggregate>>,
    pub exceptions: Option<Vec<ExceptionRecord>>,
    pub thread_stats: Option<Vec<ThreadStat>>,
    pub filters: Option<FilterAnalysis>,
    /// Per-queue gap/latency summaries.
    pub gaps: Option<Vec<QueueHealth>>,
    pub queued_calls: Vec<QueuedCall>,
    pub logging_activity: Vec<LoggingActivity>,
    pub file_metadata: Option<FileMetadata>,
    /// Sections this parser does not understand, preserved verbatim.
    pub unknown_sections: IndexMap<String, String>,
}

/// Parse analyzer stdout into a [`ParseResult`].
///
/// Empty (or whitespace-only) input is a [`ParseError`]: the analyzer always
/// emits at least a statistics section. Text before the first header is
/// ignored; analyzers prepend banners.
pub fn parse_report(stdout: &str) -> Result<ParseResult, ParseError> {
    if stdout.trim().is_empty() {
        return Err(ParseError::empty());
    }

    let mut result = ParseResult::default();

    for section in split_sections(stdout) {
        match section.name.as_str() {
            "General Statistics" => {
                let (stats, health_score) = stats::parse_general(&section)?;
                result.dashboard.statistics = stats;
                result.dashboard.health_score = health_score;
            }
            "Slow API Calls" => {
                result.dashboard.slow_apis = tables::parse_top_entries(&section)?;
            }
            "Slow SQL Statements" => {
                result.dashboard.slow_sql = tables::parse_top_entries(&section)?;
            }
            "Top Filters" => {
                result.dashboard.top_filters = tables::parse_top_entries(&section)?;
            }
            "Top Escalations" => {
                result.dashboard.top_escalations = tables::parse_top_entries(&section)?;
            }
            "Errors" => {
                result.dashboard.distributions.errors = tables::parse_error_counts(&section)?;
            }
            "Aggregates" => {
                result.aggregates = Some(tables::parse_aggregates(&section)?);
            }
            "Exceptions" => {
                result.exceptions = Some(tables::parse_exceptions(&section)?);
            }
            "Thread Statistics" => {
                result.thread_stats = Some(tables::parse_thread_stats(&section)?);
            }
            "Most Executed Filters" => {
                result
                    .filters
                    .get_or_insert_with(FilterAnalysis::default)
                    .most_executed = tables::parse_filter_stats(&section)?;
            }
            "Gaps" => {
                result.gaps = Some(tables::parse_queue_health(&section)?);
            }
            "Queued Calls" => {
                result.queued_calls = tables::parse_queued_calls(&section)?;
            }
            "Logging Activity" => {
                result.logging_activity = tables::parse_logging_activity(&section)?;
            }
            "File Metadata" => {
                result.file_metadata = Some(stats::parse_file_metadata(&section)?);
            }
            _ => {
                result.unknown_sections.insert(section.name.clone(), section.body());
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
