// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exception derivation from the error distribution map.

use loupe_core::{DashboardData, ExceptionRecord};

/// One record per distinct error message, in map order. The rate is
/// computed against the API call count.
pub(super) fn derive(dashboard: &DashboardData) -> Vec<ExceptionRecord> {
    let api_count = dashboard.statistics.api_count;
    dashboard
        .distributions
        .errors
        .iter()
        .map(|(message, count)| ExceptionRecord {
            message: message.clone(),
            count: *count,
            rate_pct: if api_count == 0 {
                0.0
            } else {
                *count as f64 * 100.0 / api_count as f64
            },
        })
        .collect()
}
