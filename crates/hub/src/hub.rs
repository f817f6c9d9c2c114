// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fan-out hub.
//!
//! One event-loop task reads register/unregister/broadcast commands from a
//! channel. Client and topic maps live under a single `RwLock`: the loop
//! takes the write lock for membership changes, broadcast fans out under the
//! read lock, and subscribe/unsubscribe mutate directly from the session's
//! read pump. The loop never blocks on a client queue; queue sends are
//! non-blocking by construction.

use crate::client::HubClient;
use crate::limits::HubConfig;
use crate::queue::SendOutcome;
use loupe_core::{TenantId, Topic};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Command-channel depth. Publishers await a slot, which is the only flow
/// control between the pipeline and the hub.
const COMMAND_DEPTH: usize = 256;

/// Errors surfaced to hub callers.
#[derive(Debug, Error)]
pub enum HubError {
    /// The client already holds the maximum number of subscriptions.
    #[error("subscription limit of {max} reached")]
    MaxSubscriptions { max: usize },

    /// The event loop is gone; the process is shutting down.
    #[error("hub is closed")]
    Closed,
}

enum Command {
    Register(Arc<HubClient>),
    Unregister(Arc<HubClient>),
    Broadcast(Topic, Arc<str>),
}

#[derive(Default)]
struct HubState {
    clients: HashMap<TenantId, HashSet<Arc<HubClient>>>,
    topics: HashMap<Topic, HashSet<Arc<HubClient>>>,
}

/// Single-process pub/sub hub.
pub struct Hub {
    config: HubConfig,
    state: RwLock<HubState>,
    tx: mpsc::Sender<Command>,
    rx: Mutex<Option<mpsc::Receiver<Command>>>,
}

impl Hub {
    /// Create a hub. The caller must drive [`Hub::run`]; [`Hub::start`]
    /// does both.
    pub fn new(config: HubConfig) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(COMMAND_DEPTH);
        Arc::new(Self {
            config: config.normalized(),
            state: RwLock::new(HubState::default()),
            tx,
            rx: Mutex::new(Some(rx)),
        })
    }

    /// Create a hub and spawn its event loop on the current runtime.
    pub fn start(config: HubConfig) -> Arc<Self> {
        let hub = Self::new(config);
        let runner = Arc::clone(&hub);
        tokio::spawn(async move { runner.run().await });
        hub
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// The event loop. Returns when every sender is gone or [`Hub::run`]
    /// was already claimed.
    pub async fn run(self: Arc<Self>) {
        let Some(mut rx) = self.rx.lock().take() else {
            return;
        };
        while let Some(command) = rx.recv().await {
            match command {
                Command::Register(client) => self.handle_register(client),
                Command::Unregister(client) => self.handle_unregister(client),
                Command::Broadcast(topic, frame) => self.handle_broadcast(&topic, frame),
            }
        }
    }

    /// Add a client to its tenant's set.
    pub async fn register(&self, client: Arc<HubClient>) -> Result<(), HubError> {
        self.tx.send(Command::Register(client)).await.map_err(|_| HubError::Closed)
    }

    /// Remove a client everywhere and close its outbound queue.
    pub async fn unregister(&self, client: Arc<HubClient>) -> Result<(), HubError> {
        self.tx.send(Command::Unregister(client)).await.map_err(|_| HubError::Closed)
    }

    /// Publish an already-marshalled frame to a topic's subscribers.
    pub async fn broadcast(&self, topic: Topic, frame: Arc<str>) -> Result<(), HubError> {
        self.tx.send(Command::Broadcast(topic, frame)).await.map_err(|_| HubError::Closed)
    }

    /// Subscribe a client to a topic. Idempotent; enforces the
    /// per-client subscription cap.
    pub fn subscribe(&self, client: &Arc<HubClient>, topic: Topic) -> Result<(), HubError> {
        let mut state = self.state.write();
        if client.is_subscribed(&topic) {
            return Ok(());
        }
        if client.subscription_count() >= self.config.max_subscriptions {
            return Err(HubError::MaxSubscriptions { max: self.config.max_subscriptions });
        }
        state.topics.entry(topic.clone()).or_default().insert(Arc::clone(client));
        client.add_subscription(topic);
        Ok(())
    }

    /// Unsubscribe a client from a topic. A topic never subscribed to is a
    /// no-op; empty topic entries are deleted.
    pub fn unsubscribe(&self, client: &Arc<HubClient>, topic: &Topic) {
        let mut state = self.state.write();
        client.remove_subscription(topic);
        if let Some(subscribers) = state.topics.get_mut(topic) {
            subscribers.remove(client);
            if subscribers.is_empty() {
                state.topics.remove(topic);
            }
        }
    }

    fn handle_register(&self, client: Arc<HubClient>) {
        tracing::debug!(client = %client.id(), tenant = %client.tenant_id(), "client registered");
        self.state
            .write()
            .clients
            .entry(client.tenant_id().clone())
            .or_default()
            .insert(client);
    }

    fn handle_unregister(&self, client: Arc<HubClient>) {
        {
            let mut state = self.state.write();
            if let Some(tenants) = state.clients.get_mut(client.tenant_id()) {
                tenants.remove(&client);
                if tenants.is_empty() {
                    state.clients.remove(client.tenant_id());
                }
            }
            for topic in client.drain_subscriptions() {
                if let Some(subscribers) = state.topics.get_mut(&topic) {
                    subscribers.remove(&client);
                    if subscribers.is_empty() {
                        state.topics.remove(&topic);
                    }
                }
            }
        }
        client.queue().close();
        tracing::debug!(client = %client.id(), tenant = %client.tenant_id(), "client unregistered");
    }

    fn handle_broadcast(&self, topic: &Topic, frame: Arc<str>) {
        let state = self.state.read();
        let Some(subscribers) = state.topics.get(topic) else {
            return;
        };
        for client in subscribers {
            match client.enqueue(Arc::clone(&frame)) {
                SendOutcome::Enqueued => {}
                SendOutcome::DroppedOldest => {
                    tracing::debug!(client = %client.id(), %topic, "queue full, dropped oldest");
                }
                SendOutcome::DroppedNew => {
                    tracing::debug!(client = %client.id(), %topic, "queue full, dropped message");
                }
                SendOutcome::Closed => {}
            }
        }
    }

    /// Number of connected clients for a tenant.
    pub fn client_count(&self, tenant: &TenantId) -> usize {
        self.state.read().clients.get(tenant).map_or(0, HashSet::len)
    }

    /// Number of subscribers on a topic.
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.state.read().topics.get(topic).map_or(0, HashSet::len)
    }

    /// True if the client is present in its tenant's set.
    pub fn is_registered(&self, client: &Arc<HubClient>) -> bool {
        self.state
            .read()
            .clients
            .get(client.tenant_id())
            .is_some_and(|set| set.contains(client))
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
