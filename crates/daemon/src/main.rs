// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! louped: the Loupe daemon.
//!
//! Wires the hub, the in-memory dev stores, and one dispatcher per
//! configured tenant, then serves WebSocket subscribers until SIGINT.
//! Deployments swap the `mem` backends for real ones at this seam.

mod env;
mod lifecycle;
mod listener;
mod telemetry;

use lifecycle::LifecycleError;
use loupe_analysis::AnalyzerRunner;
use loupe_hub::{Hub, HubBroker, HubConfig};
use loupe_pipeline::{Dispatcher, Orchestrator, OrchestratorConfig, Stores};
use loupe_store::{MemoryCache, MemoryLogStore, MemoryObjectStore, MemoryRegistry};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), LifecycleError> {
    let _guard = telemetry::init(&env::log_dir()?)?;

    let hub = Hub::start(
        HubConfig {
            send_buffer: env::send_buffer_size(),
            max_subscriptions: env::max_subscriptions(),
            max_message_size: env::max_message_size(),
            ping_period: env::ping_period(),
            pong_wait: env::pong_wait(),
            write_wait: env::write_wait(),
        }
        .normalized(),
    );
    let broker = Arc::new(HubBroker::new(Arc::clone(&hub)));

    let stores = Stores {
        registry: Arc::new(MemoryRegistry::new()),
        log_store: Arc::new(MemoryLogStore::new()),
        objects: Arc::new(MemoryObjectStore::new()),
        cache: Arc::new(MemoryCache::new()),
        broker: broker.clone(),
    };
    let runner = AnalyzerRunner::new(
        env::analyzer_bin(),
        env::analyzer_heap_mb(),
        env::analyzer_timeout(),
    );
    let orchestrator = Arc::new(Orchestrator::new(
        stores,
        runner,
        OrchestratorConfig {
            anomaly_threshold: env::anomaly_threshold(),
            log_batch_size: env::log_batch_size(),
            cache_section_ttl: env::cache_section_ttl(),
        },
    ));

    let shutdown = CancellationToken::new();

    for tenant in env::tenants() {
        let dispatcher = Dispatcher::new(
            tenant.as_str().into(),
            broker.clone(),
            Arc::clone(&orchestrator),
        );
        let token = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher.start(token).await {
                warn!(tenant = %tenant, error = %e, "dispatcher exited with error");
            }
        });
    }

    let addr = env::listen_addr();
    let tcp = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| LifecycleError::Bind { addr: addr.clone(), source })?;
    let accept = tokio::spawn(listener::run(tcp, Arc::clone(&hub), shutdown.clone()));

    info!(%addr, "louped running, ctrl-c to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "signal wait failed, shutting down");
    }

    shutdown.cancel();
    let _ = accept.await;
    info!("louped stopped");
    Ok(())
}
