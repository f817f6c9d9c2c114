// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! loupe-hub: Single-process realtime fan-out.
//!
//! One event-loop task owns client and topic maps; broadcasts fan out to
//! bounded per-client queues with a drop-oldest policy. Each WebSocket gets
//! a read pump and a write pump; delivery is at-most-once by design.

pub mod broker;
pub mod client;
pub mod hub;
pub mod limits;
pub mod protocol;
pub mod queue;
pub mod session;

pub use broker::HubBroker;
pub use client::HubClient;
pub use hub::{Hub, HubError};
pub use limits::HubConfig;
pub use protocol::{codes, ClientMessage, ServerMessage};
pub use queue::{OutboundQueue, SendOutcome};
pub use session::run_session;
