// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-queue latency summaries from the leaderboards.

use indexmap::IndexMap;
use loupe_core::{DashboardData, LogType, QueueHealth};

struct Acc {
    call_count: u64,
    total_ms: u64,
    error_count: u64,
    row_avgs: Vec<f64>,
}

/// Nearest-rank percentile over the per-row averages.
fn percentile(values: &mut [f64], pct: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = ((pct / 100.0) * values.len() as f64).ceil() as usize;
    values[rank.clamp(1, values.len()) - 1] as u64
}

/// Group all leaderboard rows by queue; p95 is computed across the
/// contributing rows' averages. Sorted by call count descending.
pub(super) fn derive(dashboard: &DashboardData) -> Vec<QueueHealth> {
    let mut by_queue: IndexMap<String, Acc> = IndexMap::new();

    for log_type in LogType::ALL {
        for entry in dashboard.top_list(log_type) {
            let Some(queue) = &entry.queue else { continue };
            let acc = by_queue.entry(queue.clone()).or_insert_with(|| Acc {
                call_count: 0,
                total_ms: 0,
                error_count: 0,
                row_avgs: Vec::new(),
            });
            acc.call_count += entry.count;
            acc.total_ms += entry.total_ms;
            acc.error_count += entry.error_count;
            acc.row_avgs.push(entry.avg_ms);
        }
    }

    let mut rows: Vec<QueueHealth> = by_queue
        .into_iter()
        .map(|(queue, mut acc)| QueueHealth {
            queue,
            call_count: acc.call_count,
            avg_duration_ms: if acc.call_count == 0 {
                0.0
            } else {
                acc.total_ms as f64 / acc.call_count as f64
            },
            p95_duration_ms: percentile(&mut acc.row_avgs, 95.0),
            error_count: acc.error_count,
        })
        .collect();
    rows.sort_by(|a, b| b.call_count.cmp(&a.call_count));
    rows
}
