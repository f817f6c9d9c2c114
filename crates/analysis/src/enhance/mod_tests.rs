// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::report::parse_report;
use loupe_core::derived::GRAND_TOTAL;
use loupe_core::test_support::sample_report;
use loupe_core::{Granularity, LogType};

fn sample_result() -> ParseResult {
    parse_report(&sample_report()).unwrap()
}

#[test]
fn fills_missing_sections_only() {
    let mut result = sample_result();
    assert!(result.aggregates.is_none());

    enhance(&mut result);

    assert!(result.aggregates.is_some());
    assert!(result.exceptions.is_some());
    assert!(result.thread_stats.is_some());
    assert!(result.filters.is_some());
    assert!(result.gaps.is_some());

    // A second pass must not disturb the first derivation.
    let before = result.clone();
    enhance(&mut result);
    assert_eq!(result, before);
}

#[test]
fn native_sections_win_over_derived() {
    let mut result = sample_result();
    let native = vec![loupe_core::ExceptionRecord {
        message: "native".to_string(),
        count: 1,
        rate_pct: 0.5,
    }];
    result.exceptions = Some(native.clone());

    enhance(&mut result);
    assert_eq!(result.exceptions, Some(native));
}

#[test]
fn aggregates_sorted_by_count_with_grand_total_last() {
    let mut result = sample_result();
    enhance(&mut result);

    let aggregates = result.aggregates.unwrap();
    let data = &aggregates[..aggregates.len() - 1];
    assert!(data.windows(2).all(|w| w[0].count >= w[1].count));

    let total = aggregates.last().unwrap();
    assert_eq!(total.identifier, GRAND_TOTAL);
    assert_eq!(total.count, data.iter().map(|a| a.count).sum::<u64>());
    assert_eq!(total.max_ms, 2100);
    // a1..a3 across APIs plus a1/a2 on SQL rows.
    assert_eq!(total.unique_traces, 3);
}

#[test]
fn exceptions_rate_is_against_api_count() {
    let mut result = sample_result();
    enhance(&mut result);

    let exceptions = result.exceptions.unwrap();
    assert_eq!(exceptions.len(), 2);
    assert_eq!(exceptions[0].message, "ARERR [302] Entry does not exist");
    assert_eq!(exceptions[0].count, 2);
    // 2 of 50 API calls.
    assert!((exceptions[0].rate_pct - 4.0).abs() < 1e-9);
}

#[test]
fn thread_stats_attribute_api_and_sql() {
    let mut result = sample_result();
    enhance(&mut result);

    let threads = result.thread_stats.unwrap();
    let t336 = threads.iter().find(|t| t.thread_id == "0000000336").unwrap();
    assert_eq!(t336.api_count, 12);
    assert_eq!(t336.sql_count, 40);
    assert_eq!(t336.total_ms, 5400 + 2000);
    assert_eq!(t336.trace_count, 1);

    // Sorted by total_ms descending.
    assert!(threads.windows(2).all(|w| w[0].total_ms >= w[1].total_ms));
}

#[test]
fn queue_health_groups_rows() {
    let mut result = sample_result();
    enhance(&mut result);

    let gaps = result.gaps.unwrap();
    let fast = gaps.iter().find(|q| q.queue == "Fast").unwrap();
    // APIs: 12 + 8 calls; SQL: 40 + 30 calls.
    assert_eq!(fast.call_count, 90);
    assert_eq!(fast.error_count, 2);
    assert!(fast.p95_duration_ms > 0);
    assert!(gaps.windows(2).all(|w| w[0].call_count >= w[1].call_count));
}

#[test]
fn backfill_filter_counts_only_when_zero() {
    let mut result = sample_result();
    result.filters = Some(loupe_core::FilterAnalysis {
        most_executed: vec![loupe_core::FilterStat {
            name: "F1".to_string(),
            count: 40,
            total_ms: 120,
            avg_ms: 3.0,
        }],
        per_transaction: Vec::new(),
    });

    // Non-zero count stays.
    assert_eq!(result.dashboard.statistics.filter_count, 300);
    backfill_filter_counts(&mut result);
    assert_eq!(result.dashboard.statistics.filter_count, 300);

    result.dashboard.statistics.filter_count = 0;
    backfill_filter_counts(&mut result);
    assert_eq!(result.dashboard.statistics.filter_count, 40);
}

#[test]
fn timeseries_minute_granularity_for_long_spans() {
    let mut result = sample_result();
    generate_timeseries(&mut result.dashboard);

    let series = &result.dashboard.timeseries;
    assert!(!series.is_empty());
    assert!(series.iter().all(|b| b.granularity == Granularity::Minute));
    // One hour and change of log window.
    assert_eq!(series.len(), 61);

    // Volume is conserved.
    let api_total: u64 = series.iter().map(|b| b.api_count).sum();
    assert_eq!(api_total, 50);
}

#[test]
fn timeseries_second_granularity_for_short_spans() {
    let mut result = parse_report(&loupe_core::test_support::minimal_report()).unwrap();
    generate_timeseries(&mut result.dashboard);

    let series = &result.dashboard.timeseries;
    assert!(series.iter().all(|b| b.granularity == Granularity::Second));
    assert_eq!(series.len(), 30);
}

#[test]
fn timeseries_respects_native_series() {
    let mut result = sample_result();
    generate_timeseries(&mut result.dashboard);
    let first = result.dashboard.timeseries.clone();
    generate_timeseries(&mut result.dashboard);
    assert_eq!(result.dashboard.timeseries, first);
}

#[test]
fn distributions_prefer_native_counts() {
    let mut result = sample_result();
    build_distributions(&mut result.dashboard);

    let dist = &result.dashboard.distributions;
    assert_eq!(dist.by_type[&LogType::Api.to_string()], 50);
    assert_eq!(dist.by_type["SQL"], 120);
    assert_eq!(dist.by_form["HPD:Help Desk"], 12);
    assert_eq!(dist.by_table["T100"], 40);
    assert_eq!(dist.by_queue["Fast"], 90);
    assert_eq!(dist.by_user["Demo"], 96);
    // Parser-owned errors map survives.
    assert_eq!(dist.errors.len(), 2);

    // Second call is a no-op once maps exist.
    let before = dist.clone();
    build_distributions(&mut result.dashboard);
    assert_eq!(result.dashboard.distributions, before);
}
