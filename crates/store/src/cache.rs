// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cache contract for derived dashboard sections.

use crate::error::CacheError;
use async_trait::async_trait;
use loupe_core::TenantId;
use std::time::Duration;

/// Build a tenant-namespaced cache key: `cache:{tenant}:part:part…`.
pub fn tenant_key(tenant: &TenantId, parts: &[&str]) -> String {
    let mut key = format!("cache:{tenant}");
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

/// Write-through cache for dashboard sections.
///
/// Only writes cross this boundary; reads belong to the (out-of-scope) REST
/// layer. Misses are silent and failures are logged and ignored by callers.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn set_json(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
