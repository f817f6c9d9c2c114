// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-series generation from the statistics envelope.
//!
//! With only aggregate counts available (raw entries are ingested later and
//! best-effort), the series is a uniform envelope across the log window:
//! honest about volume and span, flat in shape. Analyzer-native series are
//! always preferred and never overwritten.

use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use loupe_core::{DashboardData, Granularity, TimeseriesBucket};

/// Generate buckets when the dashboard has none.
///
/// Minute granularity when the span exceeds one minute, second granularity
/// otherwise.
pub fn generate_timeseries(dashboard: &mut DashboardData) {
    if !dashboard.timeseries.is_empty() {
        return;
    }
    let stats = dashboard.statistics.clone();
    let (Some(start), Some(end)) = (stats.log_start, stats.log_end) else {
        return;
    };
    if end < start {
        return;
    }

    let span_ms = (end - start).num_milliseconds() as u64;
    let (granularity, width) = if span_ms > 60_000 {
        (Granularity::Minute, ChronoDuration::minutes(1))
    } else {
        (Granularity::Second, ChronoDuration::seconds(1))
    };

    let first = truncate(start, width);
    let mut bucket_starts = Vec::new();
    let mut cursor = first;
    while cursor <= end {
        bucket_starts.push(cursor);
        cursor += width;
    }

    let n = bucket_starts.len() as u64;
    let avg_duration_ms = overall_avg_ms(dashboard);

    dashboard.timeseries = bucket_starts
        .into_iter()
        .enumerate()
        .map(|(i, bucket)| TimeseriesBucket {
            bucket,
            granularity,
            api_count: spread(stats.api_count, n, i as u64),
            sql_count: spread(stats.sql_count, n, i as u64),
            filter_count: spread(stats.filter_count, n, i as u64),
            escalation_count: spread(stats.escalation_count, n, i as u64),
            error_count: spread(stats.error_count, n, i as u64),
            avg_duration_ms,
        })
        .collect();
}

fn truncate(ts: DateTime<Utc>, width: ChronoDuration) -> DateTime<Utc> {
    ts.duration_trunc(width).unwrap_or(ts)
}

/// Even split of `total` across `n` buckets, remainder on the leading ones.
fn spread(total: u64, n: u64, index: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    total / n + u64::from(index < total % n)
}

/// Mean duration across all leaderboard rows, weighted by call count.
fn overall_avg_ms(dashboard: &DashboardData) -> f64 {
    let mut count: u64 = 0;
    let mut total_ms: u64 = 0;
    for log_type in loupe_core::LogType::ALL {
        for entry in dashboard.top_list(log_type) {
            count += entry.count;
            total_ms += entry.total_ms;
        }
    }
    if count == 0 {
        0.0
    } else {
        total_ms as f64 / count as f64
    }
}
