// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub and session bounds.

use std::time::Duration;

/// Bounds for the hub and its client sessions.
///
/// `ping_period < pong_wait` is an invariant: a connection must see at least
/// one ping inside every read-deadline window.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Outbound queue slots per client.
    pub send_buffer: usize,
    /// Topic subscriptions per client.
    pub max_subscriptions: usize,
    /// Largest accepted inbound frame, bytes.
    pub max_message_size: usize,
    /// Interval between server pings.
    pub ping_period: Duration,
    /// Read deadline; reset whenever a frame arrives.
    pub pong_wait: Duration,
    /// Per-write deadline.
    pub write_wait: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            send_buffer: 1000,
            max_subscriptions: 10,
            max_message_size: 16 * 1024,
            ping_period: Duration::from_secs(30),
            pong_wait: Duration::from_secs(60),
            write_wait: Duration::from_secs(10),
        }
    }
}

impl HubConfig {
    /// Clamp the heartbeat pair so the invariant holds.
    pub fn normalized(mut self) -> Self {
        if self.ping_period >= self.pong_wait {
            tracing::warn!(
                ping_period_ms = self.ping_period.as_millis() as u64,
                pong_wait_ms = self.pong_wait.as_millis() as u64,
                "ping period must stay below pong wait, clamping"
            );
            self.ping_period = self.pong_wait / 2;
        }
        self
    }
}

#[cfg(test)]
#[path = "limits_tests.rs"]
mod tests;
