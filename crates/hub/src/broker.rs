// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker backed by the in-process hub.
//!
//! The pipeline publishes through the [`Broker`] contract; this
//! implementation marshals each event once and hands the frame to the hub
//! for fan-out. Job submissions flow over per-tenant channels, the same
//! shape the in-memory broker uses.

use crate::hub::Hub;
use async_trait::async_trait;
use loupe_core::job::{AnalysisJob, JobId, JobStatus, JobSubmission};
use loupe_core::{Event, LogEntry, TenantId};
use loupe_store::broker::{Broker, BrokerError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

const SUBMIT_SUBJECT_DEPTH: usize = 64;

/// In-process broker publishing into a [`Hub`].
pub struct HubBroker {
    hub: Arc<Hub>,
    submit_subjects: Mutex<HashMap<TenantId, mpsc::Sender<JobSubmission>>>,
}

impl HubBroker {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub, submit_subjects: Mutex::new(HashMap::new()) }
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

    async fn publish(&self, event: &Event) -> Result<(), BrokerError> {
        let frame = serde_json::to_string(event).map_err(|e| BrokerError::Backend(e.to_string()))?;
        self.hub
            .broadcast(event.topic(), Arc::from(frame.as_str()))
            .await
            .map_err(|e| BrokerError::Closed(e.to_string()))
    }
}

#[async_trait]
impl Broker for HubBroker {
    async fn publish_job_progress(
        &self,
        tenant: &TenantId,
        job: &JobId,
        progress_pct: u8,
        status: JobStatus,
        message: Option<String>,
    ) -> Result<(), BrokerError> {
        self.publish(&Event::JobProgress {
            tenant_id: tenant.clone(),
            job_id: job.clone(),
            progress_pct,
            status,
            message,
        })
        .await
    }

    async fn publish_job_complete(&self, job: &AnalysisJob) -> Result<(), BrokerError> {
        self.publish(&Event::JobComplete {
            tenant_id: job.tenant_id.clone(),
            job_id: job.id.clone(),
            job: Box::new(job.clone()),
        })
        .await
    }

    async fn publish_live_tail(&self, entry: &LogEntry) -> Result<(), BrokerError> {
        self.publish(&Event::LiveTailEntry {
            tenant_id: entry.tenant_id.clone(),
            job_id: entry.job_id.clone(),
            entry: Box::new(entry.clone()),
        })
        .await
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
