// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// WebSocket listen address.
pub fn listen_addr() -> String {
    std::env::var("LOUPE_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:7410".to_string())
}

/// Tenants to run dispatchers for (comma-separated).
pub fn tenants() -> Vec<String> {
    std::env::var("LOUPE_TENANTS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Z-score threshold for anomaly detection. Non-positive values collapse to
/// the default downstream.
pub fn anomaly_threshold() -> f64 {
    parse_var("LOUPE_ANOMALY_THRESHOLD").unwrap_or(3.0)
}

/// Outbound queue slots per client.
pub fn send_buffer_size() -> usize {
    parse_var("LOUPE_SEND_BUFFER_SIZE").unwrap_or(1000)
}

/// Topic subscriptions per client.
pub fn max_subscriptions() -> usize {
    parse_var("LOUPE_MAX_SUBSCRIPTIONS").unwrap_or(10)
}

/// Largest accepted inbound WebSocket frame, bytes.
pub fn max_message_size() -> usize {
    parse_var("LOUPE_MAX_MESSAGE_SIZE").unwrap_or(16 * 1024)
}

pub fn ping_period() -> Duration {
    Duration::from_secs(parse_var("LOUPE_PING_PERIOD_SECS").unwrap_or(30))
}

pub fn pong_wait() -> Duration {
    Duration::from_secs(parse_var("LOUPE_PONG_WAIT_SECS").unwrap_or(60))
}

pub fn write_wait() -> Duration {
    Duration::from_secs(parse_var("LOUPE_WRITE_WAIT_SECS").unwrap_or(10))
}

/// Rows per columnar insert batch.
pub fn log_batch_size() -> usize {
    parse_var("LOUPE_LOG_BATCH_SIZE").unwrap_or(5_000)
}

/// TTL for cached dashboard sections.
pub fn cache_section_ttl() -> Duration {
    Duration::from_secs(parse_var("LOUPE_CACHE_SECTION_TTL_SECS").unwrap_or(24 * 60 * 60))
}

/// Path of the external analyzer binary.
pub fn analyzer_bin() -> PathBuf {
    std::env::var("LOUPE_ANALYZER_BIN")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("arlog-analyzer"))
}

/// Default analyzer heap hint, MiB.
pub fn analyzer_heap_mb() -> u32 {
    parse_var("LOUPE_ANALYZER_HEAP_MB").unwrap_or(2048)
}

/// Hard upper bound on one analyzer run.
pub fn analyzer_timeout() -> Duration {
    Duration::from_secs(parse_var("LOUPE_ANALYZER_TIMEOUT_SECS").unwrap_or(900))
}

/// Resolve the state directory:
/// `LOUPE_STATE_DIR` > platform state dir (`~/.local/state/loupe`) >
/// `~/.local/state/loupe` under the home directory.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("LOUPE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = dirs::state_dir() {
        return Ok(dir.join("loupe"));
    }
    dirs::home_dir()
        .map(|home| home.join(".local/state/loupe"))
        .ok_or(LifecycleError::NoStateDir)
}

/// Directory for daemon log files; defaults next to the state dir.
pub fn log_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("LOUPE_LOG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(state_dir()?.join("logs"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
