// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared world-building for the scenario specs.

use futures_util::{SinkExt, StreamExt};
use loupe_analysis::AnalyzerRunner;
use loupe_core::job::{AnalysisJob, JobSubmission};
use loupe_core::{FakeClock, LogFile, TenantId, UserId};
use loupe_hub::{run_session, Hub, HubBroker, HubClient, HubConfig};
use loupe_pipeline::{Orchestrator, OrchestratorConfig, Stores};
use loupe_store::{MemoryCache, MemoryLogStore, MemoryObjectStore, MemoryRegistry};

pub use loupe_store::JobRegistry;
use sha2::{Digest, Sha256};
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::DuplexStream;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

pub use serde_json::Value;
pub use tokio_util::sync::CancellationToken;

pub const TENANT: &str = "acme";

/// Everything a scenario needs: hub, stores, and an orchestrator driving a
/// fake analyzer script.
pub struct World {
    pub hub: Arc<Hub>,
    pub broker: Arc<HubBroker>,
    pub registry: Arc<MemoryRegistry<FakeClock>>,
    pub log_store: Arc<MemoryLogStore>,
    pub cache: Arc<MemoryCache<FakeClock>>,
    pub orchestrator: Arc<Orchestrator<FakeClock>>,
    _dir: TempDir,
}

impl World {
    /// Build a world whose analyzer prints `report`, with `raw_log` staged
    /// as the uploaded blob for `job-1`.
    pub fn new(hub_config: HubConfig, report: &str, raw_log: &str) -> Self {
        Self::with_script(
            hub_config,
            &format!("cat <<'REPORT_EOF'\n{report}\nREPORT_EOF"),
            raw_log,
        )
    }

    /// Like [`World::new`] but with a raw shell body for the fake analyzer.
    pub fn with_script(hub_config: HubConfig, script_body: &str, raw_log: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let bin = dir.path().join("analyzer.sh");
        std::fs::write(&bin, format!("#!/bin/sh\n{script_body}\n")).expect("write script");
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");

        let hub = Hub::start(hub_config);
        let broker = Arc::new(HubBroker::new(Arc::clone(&hub)));

        let clock = FakeClock::new();
        let registry = Arc::new(MemoryRegistry::with_clock(clock.clone()));
        let log_store = Arc::new(MemoryLogStore::new());
        let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
        let objects = Arc::new(MemoryObjectStore::new());

        objects.put("blobs/file-1", raw_log.as_bytes().to_vec());
        registry.insert_file(LogFile {
            id: "file-1".into(),
            tenant_id: TENANT.into(),
            blob_key: "blobs/file-1".to_string(),
            size_bytes: raw_log.len() as u64,
            checksum: format!("{:x}", Sha256::digest(raw_log.as_bytes())),
        });
        registry.insert_job(AnalysisJob::builder().id("job-1").tenant_id(TENANT).build());

        let stores = Stores {
            registry: registry.clone(),
            log_store: log_store.clone(),
            objects,
            cache: cache.clone(),
            broker: broker.clone(),
        };
        let orchestrator = Arc::new(Orchestrator::with_clock(
            stores,
            AnalyzerRunner::new(bin, 512, Duration::from_secs(30)),
            OrchestratorConfig::default(),
            clock,
        ));

        World { hub, broker, registry, log_store, cache, orchestrator, _dir: dir }
    }

    /// Run `job-1` to a terminal state.
    pub async fn process_job(&self) {
        self.process_job_with(&CancellationToken::new()).await;
    }

    pub async fn process_job_with(&self, token: &CancellationToken) {
        let submission =
            JobSubmission { tenant_id: TENANT.into(), job_id: "job-1".into() };
        self.orchestrator.process_job(token, &submission).await;
    }

    /// Attach an in-memory WebSocket client for `tenant`.
    pub async fn connect(&self, tenant: &str) -> WsClient {
        let client = Arc::new(HubClient::new(
            TenantId::new(tenant),
            UserId::new("user-1"),
            self.hub.config().send_buffer,
        ));

        let (server_io, client_io) = tokio::io::duplex(256 * 1024);
        let server_ws = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
        let client_ws = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;

        tokio::spawn(run_session(
            Arc::clone(&self.hub),
            Arc::clone(&client),
            server_ws,
        ));
        tokio::task::yield_now().await;

        WsClient { ws: client_ws, hub_client: client }
    }
}

/// Test-side handle on one connected WebSocket.
pub struct WsClient {
    ws: WebSocketStream<DuplexStream>,
    pub hub_client: Arc<HubClient>,
}

impl WsClient {
    pub async fn send(&mut self, text: &str) {
        self.ws.send(Message::text(text.to_string())).await.expect("ws send");
    }

    /// Subscribe to `job-1` progress and fence with a ping so the
    /// subscription is applied before returning.
    pub async fn subscribe_job_progress(&mut self, job_id: &str) {
        self.send(&format!(
            r#"{{"type":"subscribe_job_progress","payload":{{"job_id":"{job_id}"}}}}"#
        ))
        .await;
        self.ping_pong().await;
    }

    pub async fn ping_pong(&mut self) {
        self.send(r#"{"type":"ping"}"#).await;
        let pong = self.next_text().await;
        assert_eq!(pong["type"], "pong");
    }

    /// Next text frame, skipping transport pings/pongs.
    pub async fn next_text(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), self.ws.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("stream ended")
                .expect("read error");
            match frame {
                Message::Text(text) => {
                    return serde_json::from_str(text.as_str()).expect("frame is json")
                }
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    }

    /// Collect text frames until one satisfies `stop`, returning all of
    /// them (the matching frame last).
    pub async fn collect_until(&mut self, stop: impl Fn(&Value) -> bool) -> Vec<Value> {
        let mut frames = Vec::new();
        loop {
            let frame = self.next_text().await;
            let done = stop(&frame);
            frames.push(frame);
            if done {
                return frames;
            }
        }
    }

}

/// A report whose slow-API leaderboard carries one ≈4.2σ outlier across 20
/// rows, for the anomaly scenario.
pub fn report_with_outlier() -> String {
    let mut report = String::from(
        "=== General Statistics ===\n\
         log_start: 2025-06-10 11:20:16.220\n\
         log_end: 2025-06-10 12:20:19.585\n\
         total_lines: 3000\n\
         api_count: 50\n\
         sql_count: 120\n\
         filter_count: 300\n\
         escalation_count: 4\n\
         error_count: 3\n\
         \n\
         === Slow API Calls ===\n\
         rank | identifier | count | total_ms | min_ms | max_ms | avg_ms | errors | trace_id | thread_id | queue | user\n",
    );
    for i in 1..=19 {
        report.push_str(&format!(
            "{i} | Form:{i:02} | 10 | 1000 | 50 | 200 | 100.0 | 0 | t{i} | thr{i} | Fast | Demo\n"
        ));
    }
    // Mean 121, sample σ ≈ 93.9 → z ≈ 4.25 for this row.
    report.push_str(
        "20 | HPD:Help Desk | 10 | 5200 | 50 | 2100 | 520.0 | 1 | t20 | thr20 | Fast | Demo\n",
    );
    report
}

/// Fifty API lines plus assorted other types, for the entry-count scenario.
pub fn raw_log_with_50_apis() -> String {
    let mut log = String::new();
    for i in 0..50 {
        let minute = 20 + (i / 10);
        let second = i % 60;
        log.push_str(&format!(
            "<API > <TID: 000000033{}> <RPC ID: 000002{i:04}> <TRID: t{i}> <Queue: Fast> <USER: Demo> /* Tue Jun 10 2025 11:{minute:02}:{second:02}.1000 */ +GLEWF ARGetListEntryWithFields -- schema HPD:Help Desk ({} ms)\n",
            i % 10,
            50 + i,
        ));
    }
    log.push_str(
        "<SQL > <TID: 0000000340> <RPC ID: 0000029999> <TRID: t99> <Queue: Fast> <USER: Demo> /* Tue Jun 10 2025 11:25:00.0000 */ SELECT C1 FROM T100 (12 ms)\n",
    );
    log
}
