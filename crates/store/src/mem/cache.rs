// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory cache with TTL bookkeeping.

use crate::cache::Cache;
use crate::error::CacheError;
use async_trait::async_trait;
use loupe_core::{Clock, SystemClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

struct CachedValue {
    value: serde_json::Value,
    expires_at_ms: u64,
}

/// Cache entries held in a map with expiry stamps from the injected clock.
pub struct MemoryCache<C: Clock = SystemClock> {
    entries: Mutex<HashMap<String, CachedValue>>,
    clock: C,
}

impl MemoryCache<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryCache<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { entries: Mutex::new(HashMap::new()), clock }
    }

    /// Read back a live entry. Expired or absent keys miss silently.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let now = self.clock.epoch_ms();
        self.entries
            .lock()
            .get(key)
            .filter(|v| v.expires_at_ms > now)
            .map(|v| v.value.clone())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.epoch_ms();
        self.entries.lock().values().filter(|v| v.expires_at_ms > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<C: Clock + 'static> Cache for MemoryCache<C> {
    async fn set_json(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let expires_at_ms = self.clock.epoch_ms().saturating_add(ttl.as_millis() as u64);
        self.entries
            .lock()
            .insert(key.to_string(), CachedValue { value: value.clone(), expires_at_ms });
        Ok(())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
