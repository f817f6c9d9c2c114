// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory broker: records publishes, queues submissions.

use crate::broker::{Broker, BrokerError};
use async_trait::async_trait;
use loupe_core::job::{AnalysisJob, JobId, JobStatus, JobSubmission};
use loupe_core::{Event, LogEntry, TenantId, Topic};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;

const SUBMIT_SUBJECT_DEPTH: usize = 64;

/// Broker backend for tests and the dev-mode daemon: published events are
/// recorded for inspection, submissions flow through per-tenant channels.
#[derive(Default)]
pub struct MemoryBroker {
    submit_subjects: Mutex<HashMap<TenantId, mpsc::Sender<JobSubmission>>>,
    published: Mutex<Vec<Event>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a submission to the tenant's subject.
    pub async fn submit_job(&self, submission: JobSubmission) -> Result<(), BrokerError> {
        let sender = self
            .submit_subjects
            .lock()
            .get(&submission.tenant_id)
            .cloned()
            .ok_or_else(|| {
                BrokerError::Closed(format!("no subscriber for tenant {}", submission.tenant_id))
            })?;
        sender
            .send(submission)
            .await
            .map_err(|e| BrokerError::Closed(format!("submit subject dropped: {e}")))
    }

    /// Every event published so far.
    pub fn events(&self) -> Vec<Event> {
        self.published.lock().clone()
    }

    /// Events that would be routed to one topic.
    pub fn events_for_topic(&self, topic: &Topic) -> Vec<Event> {
        self.published.lock().iter().filter(|e| &e.topic() == topic).cloned().collect()
    }

    fn record(&self, event: Event) {
        self.published.lock().push(event);
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn publish_job_progress(
        &self,
        tenant: &TenantId,
        job: &JobId,
        progress_pct: u8,
        status: JobStatus,
        message: Option<String>,
    ) -> Result<(), BrokerError> {
        self.record(Event::JobProgress {
            tenant_id: tenant.clone(),
            job_id: job.clone(),
            progress_pct,
            status,
            message,
        });
        Ok(())
    }

    async fn publish_job_complete(&self, job: &AnalysisJob) -> Result<(), BrokerError> {
        self.record(Event::JobComplete {
            tenant_id: job.tenant_id.clone(),
            job_id: job.id.clone(),
            job: Box::new(job.clone()),
        });
        Ok(())
    }

    async fn publish_live_tail(&self, entry: &LogEntry) -> Result<(), BrokerError> {
        self.record(Event::LiveTailEntry {
            tenant_id: entry.tenant_id.clone(),
            job_id: entry.job_id.clone(),
            entry: Box::new(entry.clone()),
        });
        Ok(())
    }

    async fn subscribe_job_submit(
        &self,
        tenant: &TenantId,
    ) -> Result<mpsc::Receiver<JobSubmission>, BrokerError> {
        let (tx, rx) = mpsc::channel(SUBMIT_SUBJECT_DEPTH);
        self.submit_subjects.lock().insert(tenant.clone(), tx);
        Ok(rx)
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
