// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket wire protocol.
//!
//! Client→server messages are `{"type": …, "payload": …}` envelopes.
//! Server→client control frames (`pong`, `error`) use the same envelope;
//! realtime events (`job_progress`, `job_complete`, `live_tail_entry`) are
//! [`loupe_core::Event`] values serialized with their fields at the top
//! level, exactly as the hub broadcast them.

use serde::{Deserialize, Serialize};

/// Error codes carried in typed `error` replies.
pub mod codes {
    /// Subscription cap reached.
    pub const MAX_SUBS: &str = "MAX_SUBS";
    /// Bad JSON, unknown type, or an empty required field.
    pub const INVALID_MESSAGE: &str = "INVALID_MESSAGE";
}

/// Subscribe/unsubscribe payload addressing a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    #[serde(default)]
    pub job_id: String,
}

/// Subscribe/unsubscribe payload addressing a live-tail log type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailRef {
    #[serde(default)]
    pub log_type: String,
}

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
    SubscribeJobProgress(JobRef),
    UnsubscribeJobProgress(JobRef),
    SubscribeLiveTail(TailRef),
    UnsubscribeLiveTail(TailRef),
}

/// Error payload of a typed `error` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

/// Control frames the server sends. Realtime events bypass this enum:
/// they are marshalled once by the broker and fanned out verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    Pong,
    Error(ErrorPayload),
}

impl ServerMessage {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload { code: code.to_string(), message: message.into() })
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
