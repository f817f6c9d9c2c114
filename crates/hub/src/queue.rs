// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded per-client outbound queue.
//!
//! Single consumer (the write pump), many producers (hub broadcast plus the
//! read pump's own replies). Sends never block: a full queue drops its
//! oldest message to admit the new one. Closing the queue is the client's
//! sole lifetime signal: the write pump drains what is left and exits.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

/// What happened to one non-blocking send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Enqueued,
    /// The queue was full; its oldest message was dropped to make room.
    DroppedOldest,
    /// The queue could not admit the message even after one drain attempt.
    DroppedNew,
    Closed,
}

struct QueueState {
    items: VecDeque<Arc<str>>,
    closed: bool,
}

/// Bounded FIFO of marshalled frames.
pub struct OutboundQueue {
    state: Mutex<QueueState>,
    capacity: usize,
    notify: Notify,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState { items: VecDeque::new(), closed: false }),
            capacity,
            notify: Notify::new(),
        }
    }

    /// Non-blocking send with the drop-oldest-then-drop-new policy.
    pub fn send(&self, message: Arc<str>) -> SendOutcome {
        let mut outcome = SendOutcome::Enqueued;
        {
            let mut state = self.state.lock();
            if state.closed {
                return SendOutcome::Closed;
            }
            if state.items.len() >= self.capacity {
                if state.items.pop_front().is_some() {
                    outcome = SendOutcome::DroppedOldest;
                }
                // Only a zero-capacity queue is still full here.
                if state.items.len() >= self.capacity {
                    return SendOutcome::DroppedNew;
                }
            }
            state.items.push_back(message);
        }
        self.notify.notify_one();
        outcome
    }

    /// Await the next message. `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<Arc<str>> {
        loop {
            {
                let mut state = self.state.lock();
                if let Some(message) = state.items.pop_front() {
                    return Some(message);
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Close the queue. Idempotent; wakes the consumer.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
