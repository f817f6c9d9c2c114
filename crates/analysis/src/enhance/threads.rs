// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread statistics from per-trace attribution across the API and SQL
//! leaderboards.

use indexmap::IndexMap;
use loupe_core::{DashboardData, LogType, ThreadStat};
use std::collections::HashSet;

struct Acc {
    api_count: u64,
    sql_count: u64,
    total_ms: u64,
    traces: HashSet<String>,
}

/// Group leaderboard rows by thread. Rows without a thread id contribute
/// nothing; output is sorted by total time descending.
pub(super) fn derive(dashboard: &DashboardData) -> Vec<ThreadStat> {
    let mut by_thread: IndexMap<String, Acc> = IndexMap::new();

    for log_type in [LogType::Api, LogType::Sql] {
        for entry in dashboard.top_list(log_type) {
            let Some(thread_id) = &entry.thread_id else { continue };
            let acc = by_thread.entry(thread_id.clone()).or_insert_with(|| Acc {
                api_count: 0,
                sql_count: 0,
                total_ms: 0,
                traces: HashSet::new(),
            });
            match log_type {
                LogType::Api => acc.api_count += entry.count,
                _ => acc.sql_count += entry.count,
            }
            acc.total_ms += entry.total_ms;
            if let Some(trace) = &entry.trace_id {
                acc.traces.insert(trace.clone());
            }
        }
    }

    let mut stats: Vec<ThreadStat> = by_thread
        .into_iter()
        .map(|(thread_id, acc)| ThreadStat {
            thread_id,
            api_count: acc.api_count,
            sql_count: acc.sql_count,
            total_ms: acc.total_ms,
            trace_count: acc.traces.len() as u64,
        })
        .collect();
    stats.sort_by(|a, b| b.total_ms.cmp(&a.total_ms));
    stats
}
