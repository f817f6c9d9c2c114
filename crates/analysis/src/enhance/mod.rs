// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enhancer: pure derivation of sections the analyzer did not produce.
//!
//! Every function here is value-in, value-out with no I/O and no clock. The
//! orchestrator decides when to call what; analyzer-native sections always
//! win over derived ones.

mod aggregates;
mod distribution;
mod exceptions;
mod filters;
mod queues;
mod threads;
mod timeseries;

pub use timeseries::generate_timeseries;

use crate::report::ParseResult;
use loupe_core::DashboardData;

/// Fill any missing derived sections of `result`.
pub fn enhance(result: &mut ParseResult) {
    if result.aggregates.is_none() {
        result.aggregates = Some(aggregates::derive(&result.dashboard));
    }
    if result.exceptions.is_none() {
        result.exceptions = Some(exceptions::derive(&result.dashboard));
    }
    if result.thread_stats.is_none() {
        result.thread_stats = Some(threads::derive(&result.dashboard));
    }
    match result.filters.as_mut() {
        None => result.filters = Some(filters::derive(&result.dashboard)),
        Some(f) if f.per_transaction.is_empty() => {
            f.per_transaction = filters::per_transaction(&result.dashboard);
        }
        Some(_) => {}
    }
    if result.gaps.is_none() {
        result.gaps = Some(queues::derive(&result.dashboard));
    }
}

/// Set the statistics filter count from filter analysis when the analyzer
/// reported zero.
pub fn backfill_filter_counts(result: &mut ParseResult) {
    if result.dashboard.statistics.filter_count > 0 {
        return;
    }
    if let Some(filters) = &result.filters {
        result.dashboard.statistics.filter_count =
            filters.most_executed.iter().map(|f| f.count).sum();
    }
}

/// Build the distribution maps when the analyzer produced none.
pub fn build_distributions(dashboard: &mut DashboardData) {
    if dashboard.distributions.is_empty() {
        distribution::build(dashboard);
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
