// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job dispatcher: drains one tenant's submission subject.
//!
//! Submissions are processed synchronously inside the receive loop, so
//! broker-level flow control applies and per-tenant processing is serial.
//! Cancelling the dispatcher's token stops the loop only; the job being
//! processed finishes with its own token.

use crate::orchestrator::Orchestrator;
use loupe_core::job::JobId;
use loupe_core::{Clock, SystemClock, TenantId};
use loupe_store::{Broker, BrokerError};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Per-tenant submission loop.
pub struct Dispatcher<C: Clock = SystemClock> {
    tenant: TenantId,
    broker: Arc<dyn Broker>,
    orchestrator: Arc<Orchestrator<C>>,
}

impl<C: Clock + 'static> Dispatcher<C> {
    pub fn new(
        tenant: TenantId,
        broker: Arc<dyn Broker>,
        orchestrator: Arc<Orchestrator<C>>,
    ) -> Self {
        Self { tenant, broker, orchestrator }
    }

    /// Subscribe and process submissions until `token` is cancelled or the
    /// subject closes.
    ///
    /// The guard window is the job's own processing: a duplicate of an
    /// in-flight job id is logged and skipped, while resubmitting a finished
    /// id reaches the orchestrator again (where the registry's terminal
    /// states make the rerun a no-op).
    pub async fn start(&self, token: CancellationToken) -> Result<(), BrokerError> {
        let mut submissions = self.broker.subscribe_job_submit(&self.tenant).await?;
        let mut in_flight: HashSet<JobId> = HashSet::new();
        tracing::info!(tenant = %self.tenant, "dispatcher started");

        loop {
            tokio::select! {
                () = token.cancelled() => {
                    tracing::info!(tenant = %self.tenant, "dispatcher stopping");
                    return Ok(());
                }
                submission = submissions.recv() => {
                    let Some(submission) = submission else {
                        tracing::info!(tenant = %self.tenant, "submit subject closed");
                        return Ok(());
                    };
                    if token.is_cancelled() {
                        return Ok(());
                    }
                    if !in_flight.insert(submission.job_id.clone()) {
                        tracing::info!(
                            tenant = %self.tenant,
                            job_id = %submission.job_id,
                            "submission already in flight, skipped"
                        );
                        continue;
                    }
                    // The job gets its own token: cancelling the dispatcher
                    // must not abort in-flight work.
                    let job_token = CancellationToken::new();
                    self.orchestrator.process_job(&job_token, &submission).await;
                    in_flight.remove(&submission.job_id);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
