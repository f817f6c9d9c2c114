// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! loupe-core: Domain types for the Loupe log-analysis service

pub mod macros;

pub mod anomaly;
pub mod clock;
pub mod dashboard;
pub mod derived;
pub mod entry;
pub mod event;
pub mod file;
pub mod id;
pub mod job;
pub mod tenant;
pub mod topic;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use anomaly::{severity_for_sigma, Anomaly, AnomalyKind, Severity};
pub use clock::{Clock, FakeClock, SystemClock};
pub use dashboard::{
    DashboardData, Distributions, GeneralStatistics, Granularity, TimeseriesBucket, TopEntry,
};
pub use derived::{
    Aggregate, ExceptionRecord, FileMetadata, FilterAnalysis, FilterStat, LoggingActivity,
    QueueHealth, QueuedCall, ThreadStat, TransactionFilters,
};
pub use entry::{EntryDetail, LogEntry, LogType};
pub use event::Event;
pub use file::LogFile;
pub use id::{short, AnomalyId, ClientId, EntryId};
#[cfg(any(test, feature = "test-support"))]
pub use job::AnalysisJobBuilder;
pub use job::{AnalysisJob, AnalyzerFlags, JobStatus, JobSubmission};
pub use tenant::{TenantId, UserId};
pub use topic::Topic;
