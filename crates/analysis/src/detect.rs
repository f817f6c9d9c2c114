// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Z-score outlier detection over dashboard series.

use loupe_core::job::JobId;
use loupe_core::{severity_for_sigma, Anomaly, AnomalyId, AnomalyKind, Clock, SystemClock, TenantId};

/// Default z-score threshold; also the floor non-positive configs collapse to.
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Minimum series length worth judging.
const MIN_POINTS: usize = 3;

/// One observation in a series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    /// The series member this value belongs to (form, table, queue, …).
    pub key: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self { key: key.into(), value }
    }
}

/// Mean and sample standard deviation (divisor `n − 1`).
///
/// A constant sequence yields `(c, 0.0)`; fewer than two values yield a
/// standard deviation of `0.0`.
pub fn mean_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// Statistical anomaly detector over top-N series.
#[derive(Clone)]
pub struct AnomalyDetector<C: Clock = SystemClock> {
    threshold: f64,
    clock: C,
}

impl AnomalyDetector<SystemClock> {
    /// Non-positive thresholds are normalised to [`DEFAULT_THRESHOLD`].
    pub fn new(threshold: f64) -> Self {
        Self::with_clock(threshold, SystemClock)
    }
}

impl Default for AnomalyDetector<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl<C: Clock> AnomalyDetector<C> {
    pub fn with_clock(threshold: f64, clock: C) -> Self {
        let threshold = if threshold > 0.0 { threshold } else { DEFAULT_THRESHOLD };
        Self { threshold, clock }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Detect outliers in `points`.
    ///
    /// Requires at least three points and non-zero variance, otherwise the
    /// result is empty. Output preserves input order. Each anomaly's
    /// `metric` is the point key, falling back to `metric` for unnamed
    /// points.
    ///
    /// Detection is short and synchronous; it deliberately takes no
    /// cancellation token and always runs to completion once entered.
    pub fn detect(
        &self,
        tenant: &TenantId,
        job: &JobId,
        kind: AnomalyKind,
        metric: &str,
        points: &[SeriesPoint],
    ) -> Vec<Anomaly> {
        if points.len() < MIN_POINTS {
            return Vec::new();
        }

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let (mean, std_dev) = mean_std_dev(&values);
        if std_dev == 0.0 {
            return Vec::new();
        }

        let detected_at = self.clock.now_utc();
        let mut anomalies = Vec::new();
        for point in points {
            let sigma = (point.value - mean).abs() / std_dev;
            if sigma < self.threshold {
                continue;
            }
            let severity = severity_for_sigma(sigma);
            tracing::debug!(
                %tenant,
                %job,
                %kind,
                key = %point.key,
                sigma,
                %severity,
                "outlier detected"
            );
            anomalies.push(Anomaly {
                id: AnomalyId::new(),
                job_id: job.clone(),
                tenant_id: tenant.clone(),
                kind,
                severity,
                metric: if point.key.is_empty() {
                    metric.to_string()
                } else {
                    point.key.clone()
                },
                value: point.value,
                baseline: mean,
                std_dev,
                sigma,
                detected_at,
            });
        }
        anomalies
    }
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
