// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distribution maps, preferring analyzer-native counts and falling back to
//! scanning the leaderboards.

use indexmap::IndexMap;
use loupe_core::{DashboardData, LogType};

fn scan(
    dashboard: &DashboardData,
    types: &[LogType],
    pick: impl Fn(&loupe_core::TopEntry) -> Option<(String, u64)>,
) -> IndexMap<String, u64> {
    let mut map = IndexMap::new();
    for log_type in types {
        for entry in dashboard.top_list(*log_type) {
            if let Some((key, count)) = pick(entry) {
                *map.entry(key).or_insert(0) += count;
            }
        }
    }
    map
}

/// Fill the `by_*` maps. The `errors` map is parser-owned and untouched.
pub(super) fn build(dashboard: &mut DashboardData) {
    let stats = &dashboard.statistics;

    // Native counts first: the statistics section always has the per-type
    // totals.
    let mut by_type = IndexMap::new();
    for log_type in LogType::ALL {
        let count = stats.count_for(log_type);
        if count > 0 {
            by_type.insert(log_type.to_string(), count);
        }
    }

    let by_form = scan(dashboard, &[LogType::Api], |e| {
        Some((e.identifier.clone(), e.count))
    });
    let by_table = scan(dashboard, &[LogType::Sql], |e| {
        Some((e.identifier.clone(), e.count))
    });
    let by_queue = scan(dashboard, &LogType::ALL, |e| {
        e.queue.clone().map(|q| (q, e.count))
    });
    let by_user = scan(dashboard, &LogType::ALL, |e| {
        e.user.clone().map(|u| (u, e.count))
    });

    let dist = &mut dashboard.distributions;
    dist.by_type = by_type;
    dist.by_form = by_form;
    dist.by_table = by_table;
    dist.by_queue = by_queue;
    dist.by_user = by_user;
}
