// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routing topics for realtime fan-out.
//!
//! A topic is a dot-delimited opaque string used only for equality matching
//! in the hub. Publishers construct topics from the originating tenant, which
//! is what makes cross-tenant delivery structurally impossible: a client may
//! subscribe to any string, but no publisher will ever broadcast another
//! tenant's data under it. The hub never parses topic strings.

use crate::entry::LogType;
use crate::job::JobId;
use crate::tenant::TenantId;
use serde::{Deserialize, Serialize};

/// An opaque routing key. Shapes in use:
/// `job_progress.<tenant>.<job>`, `job_complete.<tenant>.<job>`,
/// `live_tail.<tenant>.<log_type>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Progress events for one job.
    pub fn job_progress(tenant: &TenantId, job: &JobId) -> Self {
        Self(format!("job_progress.{tenant}.{job}"))
    }

    /// Terminal snapshot event for one job.
    pub fn job_complete(tenant: &TenantId, job: &JobId) -> Self {
        Self(format!("job_complete.{tenant}.{job}"))
    }

    /// Live tail of parsed entries of one log type.
    pub fn live_tail(tenant: &TenantId, log_type: LogType) -> Self {
        Self(format!("live_tail.{tenant}.{log_type}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Topic {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
#[path = "topic_tests.rs"]
mod tests;
