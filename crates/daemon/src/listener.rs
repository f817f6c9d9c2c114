// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket listener.
//!
//! Accepts TCP connections, upgrades them with identity taken from the dev
//! headers (`x-loupe-tenant`, `x-loupe-user`; production deployments put a
//! token-validating proxy in front and inject the same headers), and hands
//! each socket to a hub session.

use loupe_core::{TenantId, UserId};
use loupe_hub::{run_session, Hub, HubClient};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Accept loop. Runs until the token is cancelled.
pub async fn run(listener: TcpListener, hub: Arc<Hub>, token: CancellationToken) {
    info!(addr = ?listener.local_addr().ok(), "websocket listener started");
    loop {
        tokio::select! {
            () = token.cancelled() => {
                info!("websocket listener stopping");
                return;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let hub = Arc::clone(&hub);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, hub).await {
                            debug!(%peer, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "accept failed"),
            }
        }
    }
}

/// Identity extracted during the upgrade handshake.
struct Identity {
    tenant: TenantId,
    user: UserId,
}

async fn handle_connection(
    stream: TcpStream,
    hub: Arc<Hub>,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let mut identity: Option<Identity> = None;
    let config = WebSocketConfig::default()
        .max_message_size(Some(hub.config().max_message_size));

    let ws = tokio_tungstenite::accept_hdr_async_with_config(
        stream,
        |request: &Request, response: Response| {
            let header = |name: &str| {
                request
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .filter(|v| !v.is_empty())
            };
            match (header("x-loupe-tenant"), header("x-loupe-user")) {
                (Some(tenant), Some(user)) => {
                    identity = Some(Identity {
                        tenant: TenantId::new(tenant),
                        user: UserId::new(user),
                    });
                    Ok(response)
                }
                _ => {
                    let mut denied = ErrorResponse::new(Some(
                        "missing x-loupe-tenant / x-loupe-user".to_string(),
                    ));
                    *denied.status_mut() =
                        tokio_tungstenite::tungstenite::http::StatusCode::UNAUTHORIZED;
                    Err(denied)
                }
            }
        },
        Some(config),
    )
    .await?;

    // The callback ran during the handshake above, so identity is set on
    // every successful upgrade.
    let Some(identity) = identity else { return Ok(()) };
    info!(tenant = %identity.tenant, user = %identity.user, "client connected");

    let client = Arc::new(HubClient::new(
        identity.tenant,
        identity.user,
        hub.config().send_buffer,
    ));
    run_session(hub, client, ws).await;
    Ok(())
}
