// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! loupe-analysis: Everything between a downloaded log file and its derived
//! data: the analyzer child process, the report and raw-log parsers, the
//! enhancer, and the anomaly detector.

pub mod detect;
pub mod enhance;
pub mod rawlog;
pub mod report;
pub mod runner;

pub use detect::{mean_std_dev, AnomalyDetector, SeriesPoint, DEFAULT_THRESHOLD};
pub use enhance::{backfill_filter_counts, build_distributions, enhance, generate_timeseries};
pub use rawlog::{BoxError, RawLogError, RawLogParser, RawParseSummary, DEFAULT_BATCH_SIZE};
pub use report::{parse_report, ParseError, ParseResult};
pub use runner::{AnalyzerRunner, RunOutput, RunRequest, RunnerError};
