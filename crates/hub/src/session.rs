// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection pumps.
//!
//! Each WebSocket runs a read pump (deadline enforcement, envelope
//! dispatch) and a write pump (queue drain, heartbeat pings). Closing the
//! socket, from either side, posts an unregister to the hub, which closes
//! the outbound queue, which ends the write pump: no orphaned tasks.

use crate::client::HubClient;
use crate::hub::{Hub, HubError};
use crate::protocol::{codes, ClientMessage, ServerMessage};
use crate::queue::SendOutcome;
use futures_util::{SinkExt, StreamExt};
use loupe_core::{LogType, Topic};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Drive one connection to completion. Registers the client, runs both
/// pumps, and guarantees unregistration on every exit path.
pub async fn run_session<S>(hub: Arc<Hub>, client: Arc<HubClient>, ws: WebSocketStream<S>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    if hub.register(Arc::clone(&client)).await.is_err() {
        return;
    }

    let (sink, stream) = ws.split();
    let writer = tokio::spawn(write_pump(Arc::clone(&hub), Arc::clone(&client), sink));

    read_pump(&hub, &client, stream).await;

    // Unregister closes the queue, which lets the write pump drain and exit.
    let _ = hub.unregister(Arc::clone(&client)).await;
    let _ = writer.await;
}

async fn read_pump<S>(
    hub: &Arc<Hub>,
    client: &Arc<HubClient>,
    mut stream: futures_util::stream::SplitStream<WebSocketStream<S>>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let pong_wait = hub.config().pong_wait;

    loop {
        // Any frame (data, pong, ping) resets the read deadline.
        let frame = match tokio::time::timeout(pong_wait, stream.next()).await {
            Err(_) => {
                tracing::debug!(client = %client.id(), "read deadline expired");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::debug!(client = %client.id(), error = %e, "read error");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => dispatch(hub, client, text.as_str()),
            Message::Close(_) => break,
            // Pings are answered by tungstenite on the next write; pongs
            // only matter for the deadline reset above.
            _ => {}
        }
    }
}

/// Decode one envelope and apply it. Invalid input earns a typed `error`
/// reply, never a disconnect.
fn dispatch(hub: &Arc<Hub>, client: &Arc<HubClient>, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(client = %client.id(), error = %e, "malformed client message");
            send_control(client, &ServerMessage::error(codes::INVALID_MESSAGE, "malformed message"));
            return;
        }
    };

    match message {
        ClientMessage::Ping => send_control(client, &ServerMessage::Pong),

        ClientMessage::SubscribeJobProgress(job) => {
            if job.job_id.is_empty() {
                send_control(
                    client,
                    &ServerMessage::error(codes::INVALID_MESSAGE, "job_id is required"),
                );
                return;
            }
            let job_id = job.job_id.as_str().into();
            let progress = Topic::job_progress(client.tenant_id(), &job_id);
            match hub.subscribe(client, progress) {
                Ok(()) => {
                    // The paired completion topic is best-effort: at the cap
                    // the progress subscription stands alone and no error is
                    // surfaced. Callers are warned in the client docs.
                    let complete = Topic::job_complete(client.tenant_id(), &job_id);
                    if let Err(e) = hub.subscribe(client, complete) {
                        tracing::debug!(
                            client = %client.id(),
                            %job_id,
                            error = %e,
                            "job_complete subscription not added"
                        );
                    }
                }
                Err(HubError::MaxSubscriptions { max }) => {
                    send_control(
                        client,
                        &ServerMessage::error(
                            codes::MAX_SUBS,
                            format!("subscription limit of {max} reached"),
                        ),
                    );
                }
                Err(e) => {
                    tracing::debug!(client = %client.id(), error = %e, "subscribe failed");
                }
            }
        }

        ClientMessage::UnsubscribeJobProgress(job) => {
            if job.job_id.is_empty() {
                send_control(
                    client,
                    &ServerMessage::error(codes::INVALID_MESSAGE, "job_id is required"),
                );
                return;
            }
            let job_id = job.job_id.as_str().into();
            hub.unsubscribe(client, &Topic::job_progress(client.tenant_id(), &job_id));
            hub.unsubscribe(client, &Topic::job_complete(client.tenant_id(), &job_id));
        }

        ClientMessage::SubscribeLiveTail(tail) => {
            let Some(log_type) = LogType::parse(&tail.log_type) else {
                send_control(
                    client,
                    &ServerMessage::error(codes::INVALID_MESSAGE, "log_type is required"),
                );
                return;
            };
            let topic = Topic::live_tail(client.tenant_id(), log_type);
            if let Err(HubError::MaxSubscriptions { max }) = hub.subscribe(client, topic) {
                send_control(
                    client,
                    &ServerMessage::error(
                        codes::MAX_SUBS,
                        format!("subscription limit of {max} reached"),
                    ),
                );
            }
        }

        ClientMessage::UnsubscribeLiveTail(tail) => {
            let Some(log_type) = LogType::parse(&tail.log_type) else {
                send_control(
                    client,
                    &ServerMessage::error(codes::INVALID_MESSAGE, "log_type is required"),
                );
                return;
            };
            hub.unsubscribe(client, &Topic::live_tail(client.tenant_id(), log_type));
        }
    }
}

/// Enqueue a control reply on the client's own queue. Shares the broadcast
/// path's drop policy: on a full queue the oldest frame goes first, and the
/// reply itself may drop rather than block the read pump.
fn send_control(client: &Arc<HubClient>, message: &ServerMessage) {
    let frame = match serde_json::to_string(message) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(client = %client.id(), error = %e, "control frame marshal failed");
            return;
        }
    };
    if client.enqueue(Arc::from(frame.as_str())) == SendOutcome::DroppedNew {
        tracing::debug!(client = %client.id(), "control reply dropped, queue full");
    }
}

async fn write_pump<S>(
    hub: Arc<Hub>,
    client: Arc<HubClient>,
    mut sink: futures_util::stream::SplitSink<WebSocketStream<S>, Message>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let ping_period = hub.config().ping_period;
    let write_wait = hub.config().write_wait;
    let mut ping = tokio::time::interval_at(
        tokio::time::Instant::now() + ping_period,
        ping_period,
    );
    ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            frame = client.queue().recv() => match frame {
                Some(frame) => {
                    let send = sink.send(Message::text(frame.to_string()));
                    match tokio::time::timeout(write_wait, send).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            tracing::debug!(client = %client.id(), error = %e, "write error");
                            return;
                        }
                        Err(_) => {
                            tracing::debug!(client = %client.id(), "write deadline expired");
                            return;
                        }
                    }
                }
                // Queue closed: the client was unregistered.
                None => {
                    let close = sink.send(Message::Close(None));
                    let _ = tokio::time::timeout(write_wait, close).await;
                    return;
                }
            },
            _ = ping.tick() => {
                let send = sink.send(Message::Ping(Vec::new().into()));
                if tokio::time::timeout(write_wait, send).await.map_or(true, |r| r.is_err()) {
                    tracing::debug!(client = %client.id(), "ping write failed");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
