// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate derivation from the top-N leaderboards.

use loupe_core::derived::GRAND_TOTAL;
use loupe_core::{Aggregate, DashboardData, LogType, TopEntry};
use std::collections::HashSet;

fn from_entry(log_type: LogType, entry: &TopEntry) -> Aggregate {
    Aggregate {
        log_type: Some(log_type),
        identifier: entry.identifier.clone(),
        count: entry.count,
        total_ms: entry.total_ms,
        min_ms: entry.min_ms,
        max_ms: entry.max_ms,
        avg_ms: entry.avg_ms,
        error_count: entry.error_count,
        error_rate_pct: rate(entry.error_count, entry.count),
        unique_traces: entry.trace_id.is_some() as u64,
    }
}

fn rate(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Per-identifier aggregates for every log type, sorted by count
/// descending, with a Grand Total row last.
pub(super) fn derive(dashboard: &DashboardData) -> Vec<Aggregate> {
    let mut rows: Vec<Aggregate> = Vec::new();
    for log_type in LogType::ALL {
        for entry in dashboard.top_list(log_type) {
            rows.push(from_entry(log_type, entry));
        }
    }
    rows.sort_by(|a, b| b.count.cmp(&a.count));

    let traces: HashSet<&str> = LogType::ALL
        .iter()
        .flat_map(|lt| dashboard.top_list(*lt))
        .filter_map(|e| e.trace_id.as_deref())
        .collect();

    let count: u64 = rows.iter().map(|r| r.count).sum();
    let total_ms: u64 = rows.iter().map(|r| r.total_ms).sum();
    let error_count: u64 = rows.iter().map(|r| r.error_count).sum();
    let total = Aggregate {
        log_type: None,
        identifier: GRAND_TOTAL.to_string(),
        count,
        total_ms,
        min_ms: rows.iter().map(|r| r.min_ms).min().unwrap_or(0),
        max_ms: rows.iter().map(|r| r.max_ms).max().unwrap_or(0),
        avg_ms: if count == 0 { 0.0 } else { total_ms as f64 / count as f64 },
        error_count,
        error_rate_pct: rate(error_count, count),
        unique_traces: traces.len() as u64,
    };
    rows.push(total);
    rows
}
