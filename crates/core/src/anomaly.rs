// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Statistical anomalies detected over dashboard series.

use crate::id::AnomalyId;
use crate::job::JobId;
use crate::tenant::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which series the anomaly was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    ApiLatency,
    SqlLatency,
    FilterVolume,
    EscalationVolume,
    ErrorRate,
}

crate::display_parse! {
    AnomalyKind {
        ApiLatency => "api_latency",
        SqlLatency => "sql_latency",
        FilterVolume => "filter_volume",
        EscalationVolume => "escalation_volume",
        ErrorRate => "error_rate",
    }
}

/// How far outside the baseline an observation sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

crate::display_parse! {
    Severity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

/// Map a z-score to a severity. Pure and monotonic non-decreasing in sigma.
pub fn severity_for_sigma(sigma: f64) -> Severity {
    if sigma < 3.5 {
        Severity::Low
    } else if sigma < 4.0 {
        Severity::Medium
    } else if sigma < 5.0 {
        Severity::High
    } else {
        Severity::Critical
    }
}

/// One detected outlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: AnomalyId,
    pub job_id: JobId,
    pub tenant_id: TenantId,
    pub kind: AnomalyKind,
    pub severity: Severity,
    /// The series key the outlying observation belongs to.
    pub metric: String,
    pub value: f64,
    /// Mean of the series the value was judged against.
    pub baseline: f64,
    pub std_dev: f64,
    /// `|value − baseline| / std_dev`.
    pub sigma: f64,
    pub detected_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "anomaly_tests.rs"]
mod tests;
