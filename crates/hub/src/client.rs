// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One connected WebSocket client.

use crate::queue::{OutboundQueue, SendOutcome};
use loupe_core::{ClientId, TenantId, Topic, UserId};
use parking_lot::Mutex;
use std::collections::HashSet;

/// In-memory state for one connection. Belongs to exactly one tenant for
/// its entire life; never survives a restart.
///
/// The hub owns the client maps; sessions hold non-owning `Arc` references.
/// Closing the outbound queue is the sole lifetime signal.
pub struct HubClient {
    id: ClientId,
    tenant_id: TenantId,
    user_id: UserId,
    queue: OutboundQueue,
    /// Guarded separately: read by both pumps while the hub mutates it.
    subscriptions: Mutex<HashSet<Topic>>,
}

impl HubClient {
    pub fn new(tenant_id: TenantId, user_id: UserId, send_buffer: usize) -> Self {
        Self {
            id: ClientId::new(),
            tenant_id,
            user_id,
            queue: OutboundQueue::new(send_buffer),
            subscriptions: Mutex::new(HashSet::new()),
        }
    }

    pub fn id(&self) -> &ClientId {
        &self.id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn queue(&self) -> &OutboundQueue {
        &self.queue
    }

    /// Non-blocking enqueue of an already-marshalled frame.
    pub fn enqueue(&self, frame: std::sync::Arc<str>) -> SendOutcome {
        self.queue.send(frame)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    pub fn is_subscribed(&self, topic: &Topic) -> bool {
        self.subscriptions.lock().contains(topic)
    }

    pub(crate) fn add_subscription(&self, topic: Topic) {
        self.subscriptions.lock().insert(topic);
    }

    pub(crate) fn remove_subscription(&self, topic: &Topic) {
        self.subscriptions.lock().remove(topic);
    }

    /// Take every subscription, leaving the set empty.
    pub(crate) fn drain_subscriptions(&self) -> Vec<Topic> {
        self.subscriptions.lock().drain().collect()
    }
}

impl PartialEq for HubClient {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HubClient {}

impl std::hash::Hash for HubClient {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for HubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubClient")
            .field("id", &self.id)
            .field("tenant_id", &self.tenant_id)
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}
