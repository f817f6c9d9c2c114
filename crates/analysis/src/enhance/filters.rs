// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filter analysis from the top-filters leaderboard.

use indexmap::IndexMap;
use loupe_core::{DashboardData, FilterAnalysis, FilterStat, TransactionFilters};

/// Per-transaction rows are capped here.
const PER_TRANSACTION_CAP: usize = 100;

/// Most-executed list plus the per-transaction slice.
pub(super) fn derive(dashboard: &DashboardData) -> FilterAnalysis {
    let mut most_executed: Vec<FilterStat> = dashboard
        .top_filters
        .iter()
        .map(|entry| FilterStat {
            name: entry.identifier.clone(),
            count: entry.count,
            total_ms: entry.total_ms,
            avg_ms: entry.avg_ms,
        })
        .collect();
    most_executed.sort_by(|a, b| b.count.cmp(&a.count));

    FilterAnalysis { most_executed, per_transaction: per_transaction(dashboard) }
}

/// Filters grouped by originating transaction, capped at 100 rows and
/// sorted by total time descending.
pub(super) fn per_transaction(dashboard: &DashboardData) -> Vec<TransactionFilters> {
    let mut by_trace: IndexMap<String, TransactionFilters> = IndexMap::new();
    for entry in &dashboard.top_filters {
        let Some(trace_id) = &entry.trace_id else { continue };
        let slot = by_trace.entry(trace_id.clone()).or_insert_with(|| TransactionFilters {
            trace_id: trace_id.clone(),
            filter_count: 0,
            total_ms: 0,
        });
        slot.filter_count += entry.count;
        slot.total_ms += entry.total_ms;
    }

    let mut rows: Vec<TransactionFilters> = by_trace.into_values().collect();
    rows.sort_by(|a, b| b.total_ms.cmp(&a.total_ms));
    rows.truncate(PER_TRANSACTION_CAP);
    rows
}
