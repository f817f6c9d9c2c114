// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-job ingestion state machine.
//!
//! ```text
//! queued → parsing → analyzing → storing → complete
//!                                      ↘  failed  (from any state)
//! ```
//!
//! Each boundary persists the status to the registry before publishing the
//! matching broker event. Cache writes, anomaly detection, and raw-entry
//! ingestion are best-effort: their failures are logged and the job still
//! completes. Everything else fails the job through [`fail_job`], which
//! writes `failed`, publishes a zero-progress failure event, and publishes
//! the terminal snapshot, each itself best-effort.
//!
//! [`fail_job`]: Orchestrator::process_job

use crate::error::PipelineError;
use crate::progress;
use loupe_analysis::rawlog::BoxError;
use loupe_analysis::report::ParseResult;
use loupe_analysis::runner::RunRequest;
use loupe_analysis::{AnalyzerRunner, AnomalyDetector, RawLogParser, SeriesPoint};
use loupe_core::job::{AnalysisJob, JobId, JobStatus, JobSubmission};
use loupe_core::{Anomaly, AnomalyKind, Clock, LogType, SystemClock, TenantId, TopEntry};
use loupe_store::{
    tenant_key, Broker, Cache, ColumnarLogStore, JobRegistry, JobSummary, ObjectStore, StoreError,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Rough bytes-per-line estimate used to scale analyzer progress.
const BYTES_PER_LINE_ESTIMATE: u64 = 256;

/// Injected store backends.
#[derive(Clone)]
pub struct Stores {
    pub registry: Arc<dyn JobRegistry>,
    pub log_store: Arc<dyn ColumnarLogStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub cache: Arc<dyn Cache>,
    pub broker: Arc<dyn Broker>,
}

/// Orchestrator tunables.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub anomaly_threshold: f64,
    pub log_batch_size: usize,
    pub cache_section_ttl: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: loupe_analysis::DEFAULT_THRESHOLD,
            log_batch_size: loupe_analysis::DEFAULT_BATCH_SIZE,
            cache_section_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Processes one job at a time through the ingestion state machine.
pub struct Orchestrator<C: Clock = SystemClock> {
    stores: Stores,
    runner: AnalyzerRunner,
    detector: AnomalyDetector<C>,
    rawlog: RawLogParser,
    cache_section_ttl: Duration,
}

impl Orchestrator<SystemClock> {
    pub fn new(stores: Stores, runner: AnalyzerRunner, config: OrchestratorConfig) -> Self {
        Self::with_clock(stores, runner, config, SystemClock)
    }
}

impl<C: Clock + 'static> Orchestrator<C> {
    pub fn with_clock(
        stores: Stores,
        runner: AnalyzerRunner,
        config: OrchestratorConfig,
        clock: C,
    ) -> Self {
        Self {
            stores,
            runner,
            detector: AnomalyDetector::with_clock(config.anomaly_threshold, clock),
            rawlog: RawLogParser::new(config.log_batch_size),
            cache_section_ttl: config.cache_section_ttl,
        }
    }

    /// Process one submission to a terminal state. Never returns an error:
    /// fatal failures are absorbed into the `failed` terminal state.
    pub async fn process_job(&self, token: &CancellationToken, submission: &JobSubmission) {
        let tenant = &submission.tenant_id;
        let job_id = &submission.job_id;
        tracing::info!(%tenant, %job_id, "processing job");

        match self.run_pipeline(token, tenant, job_id).await {
            Ok(()) => tracing::info!(%tenant, %job_id, "job complete"),
            Err(e) => {
                let reason = e.job_message();
                tracing::warn!(%tenant, %job_id, error = %e, "job failed");
                self.fail_job(tenant, job_id, &reason).await;
            }
        }
    }

    async fn run_pipeline(
        &self,
        token: &CancellationToken,
        tenant: &TenantId,
        job_id: &JobId,
    ) -> Result<(), PipelineError> {
        let registry = &self.stores.registry;
        let job = registry.get_job(tenant, job_id).await?;
        let file = registry.get_log_file(tenant, &job.file_id).await?;

        registry.update_job_status(tenant, job_id, JobStatus::Parsing, None).await?;

        // Stage the blob to a temp file. The guard removes it on every exit
        // path, including panics.
        let staged = tempfile::NamedTempFile::new()
            .map_err(|e| PipelineError::Staging(e.to_string()))?;
        self.download_to(&file.blob_key, &file.checksum, staged.path()).await?;
        self.report_progress(tenant, job_id, progress::DOWNLOADED, JobStatus::Parsing, None)
            .await;

        self.check_cancelled(token)?;
        registry.update_job_status(tenant, job_id, JobStatus::Analyzing, None).await?;
        self.report_progress(tenant, job_id, progress::RUN, JobStatus::Analyzing, None).await;

        let stdout = self
            .run_analyzer(token, &job, staged.path(), file.size_bytes)
            .await?;

        self.check_cancelled(token)?;
        let mut result = loupe_analysis::parse_report(&stdout)?;
        loupe_analysis::enhance(&mut result);
        loupe_analysis::backfill_filter_counts(&mut result);
        loupe_analysis::generate_timeseries(&mut result.dashboard);
        loupe_analysis::build_distributions(&mut result.dashboard);
        self.report_progress(tenant, job_id, progress::PARSED, JobStatus::Analyzing, None)
            .await;

        self.check_cancelled(token)?;
        registry.update_job_status(tenant, job_id, JobStatus::Storing, None).await?;
        self.report_progress(tenant, job_id, progress::STORED, JobStatus::Storing, None).await;

        // Best-effort from here until the terminal update.
        let anomalies = self.detect_anomalies(tenant, job_id, &result);
        self.cache_sections(tenant, job_id, &result, &anomalies).await;
        let raw_lines = self.ingest_raw_entries(tenant, job_id, staged.path()).await;
        self.record_summary(tenant, job_id, &result, raw_lines).await;
        self.report_progress(tenant, job_id, progress::INDEXED, JobStatus::Storing, None).await;

        self.check_cancelled(token)?;
        registry.update_job_status(tenant, job_id, JobStatus::Complete, None).await?;
        self.report_progress(tenant, job_id, progress::DONE, JobStatus::Complete, None).await;
        self.publish_snapshot(tenant, job_id).await;

        Ok(())
    }

    fn check_cancelled(&self, token: &CancellationToken) -> Result<(), PipelineError> {
        if token.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Stream the blob into `path`, verifying its checksum on the way.
    async fn download_to(
        &self,
        blob_key: &str,
        checksum: &str,
        path: &std::path::Path,
    ) -> Result<(), PipelineError> {
        let mut stream = self.stores.objects.download(blob_key).await?;
        let mut out = tokio::fs::File::create(path)
            .await
            .map_err(|e| PipelineError::Staging(e.to_string()))?;

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = stream
                .read(&mut buf)
                .await
                .map_err(|e| PipelineError::Store(StoreError::backend(e)))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            out.write_all(&buf[..n])
                .await
                .map_err(|e| PipelineError::Staging(e.to_string()))?;
        }
        out.flush().await.map_err(|e| PipelineError::Staging(e.to_string()))?;

        let digest = format!("{:x}", hasher.finalize());
        if !checksum.is_empty() && digest != checksum {
            return Err(PipelineError::Store(StoreError::Integrity {
                blob_key: blob_key.to_string(),
                detail: format!("expected {checksum}, downloaded {digest}"),
            }));
        }
        Ok(())
    }

    /// Run the analyzer with line-driven progress forwarding.
    ///
    /// The line callback must not block, so it only posts counts onto an
    /// unbounded channel; a forwarder task coalesces them into registry
    /// updates and broker publishes.
    async fn run_analyzer(
        &self,
        token: &CancellationToken,
        job: &AnalysisJob,
        staged_path: &std::path::Path,
        size_bytes: u64,
    ) -> Result<String, PipelineError> {
        let expected_lines = (size_bytes / BYTES_PER_LINE_ESTIMATE).max(1);
        let (line_tx, mut line_rx) = mpsc::unbounded_channel::<u64>();

        let registry = Arc::clone(&self.stores.registry);
        let broker = Arc::clone(&self.stores.broker);
        let tenant = job.tenant_id.clone();
        let job_id = job.id.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(mut count) = line_rx.recv().await {
                // Coalesce to the newest count; stale updates are useless.
                while let Ok(newer) = line_rx.try_recv() {
                    count = newer;
                }
                let pct = progress::scale_lines(count, expected_lines);
                if let Err(e) = registry
                    .update_job_progress(&tenant, &job_id, pct, Some(count))
                    .await
                {
                    tracing::warn!(%tenant, %job_id, error = %e, "progress update failed");
                }
                if let Err(e) = broker
                    .publish_job_progress(&tenant, &job_id, pct, JobStatus::Analyzing, None)
                    .await
                {
                    tracing::debug!(%tenant, %job_id, error = %e, "progress publish failed");
                }
            }
        });

        let request = RunRequest {
            file_path: staged_path.to_path_buf(),
            flags: job.flags.clone(),
            heap_mb: job.heap_mb,
            timeout: job.timeout_secs.map(Duration::from_secs),
        };
        let output = self
            .runner
            .run(token, &request, |n, _line| {
                if n % progress::LINE_UPDATE_EVERY == 0 {
                    let _ = line_tx.send(n);
                }
            })
            .await;

        drop(line_tx);
        let _ = forwarder.await;

        let output = output?;
        if !output.stderr.is_empty() {
            tracing::info!(
                job_id = %job.id,
                stderr_bytes = output.stderr.len(),
                "analyzer diagnostics retained"
            );
        }
        Ok(output.stdout)
    }

    /// Z-score detection over every top-N series. Best-effort: an empty
    /// result is indistinguishable from "nothing anomalous", and that is
    /// fine; the job completes either way.
    fn detect_anomalies(
        &self,
        tenant: &TenantId,
        job_id: &JobId,
        result: &ParseResult,
    ) -> Vec<Anomaly> {
        let dashboard = &result.dashboard;
        let latency = |entries: &[TopEntry]| -> Vec<SeriesPoint> {
            entries.iter().map(|e| SeriesPoint::new(e.identifier.clone(), e.avg_ms)).collect()
        };
        let volume = |entries: &[TopEntry]| -> Vec<SeriesPoint> {
            entries
                .iter()
                .map(|e| SeriesPoint::new(e.identifier.clone(), e.count as f64))
                .collect()
        };

        let mut anomalies = Vec::new();
        anomalies.extend(self.detector.detect(
            tenant,
            job_id,
            AnomalyKind::ApiLatency,
            "avg_ms",
            &latency(&dashboard.slow_apis),
        ));
        anomalies.extend(self.detector.detect(
            tenant,
            job_id,
            AnomalyKind::SqlLatency,
            "avg_ms",
            &latency(&dashboard.slow_sql),
        ));
        anomalies.extend(self.detector.detect(
            tenant,
            job_id,
            AnomalyKind::FilterVolume,
            "count",
            &volume(&dashboard.top_filters),
        ));
        anomalies.extend(self.detector.detect(
            tenant,
            job_id,
            AnomalyKind::EscalationVolume,
            "count",
            &volume(&dashboard.top_escalations),
        ));
        let error_points: Vec<SeriesPoint> = dashboard
            .distributions
            .errors
            .iter()
            .map(|(message, count)| SeriesPoint::new(message.clone(), *count as f64))
            .collect();
        anomalies.extend(self.detector.detect(
            tenant,
            job_id,
            AnomalyKind::ErrorRate,
            "count",
            &error_points,
        ));

        if !anomalies.is_empty() {
            tracing::info!(%tenant, %job_id, count = anomalies.len(), "anomalies detected");
        }
        anomalies
    }

    /// Cache the dashboard and every derived section. Failures are logged
    /// and never abort the job.
    async fn cache_sections(
        &self,
        tenant: &TenantId,
        job_id: &JobId,
        result: &ParseResult,
        anomalies: &[Anomaly],
    ) {
        let dashboard_payload = serde_json::json!({
            "dashboard": result.dashboard,
            "anomalies": anomalies,
        });
        self.put_section(tenant, job_id, None, dashboard_payload).await;

        self.put_optional(tenant, job_id, "agg", result.aggregates.as_ref()).await;
        self.put_optional(tenant, job_id, "exc", result.exceptions.as_ref()).await;
        self.put_optional(tenant, job_id, "gaps", result.gaps.as_ref()).await;
        self.put_optional(tenant, job_id, "threads", result.thread_stats.as_ref()).await;
        self.put_optional(tenant, job_id, "filters", result.filters.as_ref()).await;
        if !result.queued_calls.is_empty() {
            self.put_optional(tenant, job_id, "queued", Some(&result.queued_calls)).await;
        }
        if !result.logging_activity.is_empty() {
            self.put_optional(tenant, job_id, "logging-activity", Some(&result.logging_activity))
                .await;
        }
        self.put_optional(tenant, job_id, "file-metadata", result.file_metadata.as_ref()).await;
    }

    async fn put_optional<T: serde::Serialize>(
        &self,
        tenant: &TenantId,
        job_id: &JobId,
        suffix: &str,
        value: Option<&T>,
    ) {
        let Some(value) = value else { return };
        match serde_json::to_value(value) {
            Ok(json) => self.put_section(tenant, job_id, Some(suffix), json).await,
            Err(e) => {
                tracing::warn!(%tenant, %job_id, suffix, error = %e, "section marshal failed");
            }
        }
    }

    async fn put_section(
        &self,
        tenant: &TenantId,
        job_id: &JobId,
        suffix: Option<&str>,
        value: serde_json::Value,
    ) {
        let key = match suffix {
            Some(suffix) => tenant_key(tenant, &["dashboard", job_id.as_str(), suffix]),
            None => tenant_key(tenant, &["dashboard", job_id.as_str()]),
        };
        if let Err(e) = self.stores.cache.set_json(&key, &value, self.cache_section_ttl).await {
            tracing::warn!(%tenant, %job_id, key, error = %e, "cache write failed");
        }
    }

    /// Parse the staged file into typed entries and batch-insert them,
    /// live-tailing one entry per type per batch. Best-effort end to end.
    /// Returns the parsed line count when the pass succeeded.
    async fn ingest_raw_entries(
        &self,
        tenant: &TenantId,
        job_id: &JobId,
        staged_path: &std::path::Path,
    ) -> Option<u64> {
        let file = match tokio::fs::File::open(staged_path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(%tenant, %job_id, error = %e, "staged file reopen failed");
                return None;
            }
        };

        let log_store = Arc::clone(&self.stores.log_store);
        let broker = Arc::clone(&self.stores.broker);
        let outcome = self
            .rawlog
            .parse_stream(BufReader::new(file), tenant, job_id, |batch| {
                let log_store = Arc::clone(&log_store);
                let broker = Arc::clone(&broker);
                async move {
                    log_store
                        .batch_insert_entries(&batch)
                        .await
                        .map_err(|e| -> BoxError { Box::new(e) })?;
                    for log_type in LogType::ALL {
                        let Some(entry) = batch.iter().find(|e| e.log_type() == log_type)
                        else {
                            continue;
                        };
                        if let Err(e) = broker.publish_live_tail(entry).await {
                            tracing::debug!(%log_type, error = %e, "live tail publish failed");
                        }
                    }
                    Ok(())
                }
            })
            .await;

        match outcome {
            Ok(summary) => {
                tracing::debug!(
                    %tenant,
                    %job_id,
                    parsed = summary.parsed,
                    skipped = summary.skipped,
                    "raw entries ingested"
                );
                Some(summary.parsed)
            }
            Err(e) => {
                tracing::warn!(%tenant, %job_id, error = %e, "raw ingestion degraded");
                None
            }
        }
    }

    /// Persist per-type counts and the log window. Best-effort: the data is
    /// derived and recomputable.
    async fn record_summary(
        &self,
        tenant: &TenantId,
        job_id: &JobId,
        result: &ParseResult,
        raw_lines: Option<u64>,
    ) {
        let stats = &result.dashboard.statistics;
        let summary = JobSummary {
            api_count: stats.api_count,
            sql_count: stats.sql_count,
            filter_count: stats.filter_count,
            escalation_count: stats.escalation_count,
            processed_lines: raw_lines.or(Some(stats.total_lines)),
            log_start: stats.log_start,
            log_end: stats.log_end,
            log_duration_ms: stats.log_duration_ms(),
        };
        if let Err(e) = self.stores.registry.record_job_summary(tenant, job_id, &summary).await {
            tracing::warn!(%tenant, %job_id, error = %e, "summary record failed");
        }
    }

    /// Registry update first, broker publish second; both best-effort.
    async fn report_progress(
        &self,
        tenant: &TenantId,
        job_id: &JobId,
        pct: u8,
        status: JobStatus,
        message: Option<String>,
    ) {
        if let Err(e) =
            self.stores.registry.update_job_progress(tenant, job_id, pct, None).await
        {
            tracing::warn!(%tenant, %job_id, pct, error = %e, "progress update failed");
        }
        if let Err(e) = self
            .stores
            .broker
            .publish_job_progress(tenant, job_id, pct, status, message)
            .await
        {
            tracing::debug!(%tenant, %job_id, pct, error = %e, "progress publish failed");
        }
    }

    /// Publish the registry's terminal row.
    async fn publish_snapshot(&self, tenant: &TenantId, job_id: &JobId) {
        match self.stores.registry.get_job(tenant, job_id).await {
            Ok(job) => {
                if let Err(e) = self.stores.broker.publish_job_complete(&job).await {
                    tracing::warn!(%tenant, %job_id, error = %e, "job_complete publish failed");
                }
            }
            Err(e) => {
                tracing::warn!(%tenant, %job_id, error = %e, "terminal snapshot fetch failed");
            }
        }
    }

    /// Terminal failure path: `status=failed` with the reason, a
    /// zero-progress failure event, and the failed snapshot. Each call is
    /// best-effort; a job is never left mid-state because the registry
    /// refuses backward transitions anyway.
    async fn fail_job(&self, tenant: &TenantId, job_id: &JobId, reason: &str) {
        if let Err(e) = self
            .stores
            .registry
            .update_job_status(tenant, job_id, JobStatus::Failed, Some(reason))
            .await
        {
            tracing::warn!(%tenant, %job_id, error = %e, "failed-status update failed");
        }
        if let Err(e) = self
            .stores
            .broker
            .publish_job_progress(
                tenant,
                job_id,
                0,
                JobStatus::Failed,
                Some(reason.to_string()),
            )
            .await
        {
            tracing::debug!(%tenant, %job_id, error = %e, "failure publish failed");
        }
        self.publish_snapshot(tenant, job_id).await;
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
