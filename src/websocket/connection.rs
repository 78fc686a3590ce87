use std::time::Duration;

use axum::extract::ws::{
    Message,
    WebSocket,
};
use chrono::Utc;
use futures_util::{
    SinkExt,
    StreamExt,
};
use tokio::{
    sync::mpsc,
    time::{
        interval_at,
        Instant,
    },
};
use uuid::Uuid;

use super::{
    tracker::{
        lock_tracker,
        SharedTracker,
    },
    types::{
        ClientMessage,
        ServerMessage,
    },
};

/// Transport-level ping period. A peer that has not answered the previous
/// ping when the next one is due is considered dead.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode server message");
            None
        }
    }
}

pub async fn handle_socket(socket: WebSocket, tracker: SharedTracker) {
    handle_socket_with(socket, tracker, HEARTBEAT_INTERVAL).await
}

/// Serves one real-time channel until the peer closes it, errors, or stops
/// answering heartbeats. The connection is registered with the tracker for
/// exactly as long as this runs.
pub async fn handle_socket_with(socket: WebSocket, tracker: SharedTracker, heartbeat: Duration) {
    let id = Uuid::new_v4();
    let current = {
        let mut tracker = lock_tracker(&tracker);
        tracker.add(id);
        tracker.current()
    };
    tracing::info!(connection = %id, active = current, "channel opened");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(32);

    let mut forward_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    if let Some(welcome) = encode(&ServerMessage::welcome(Utc::now())) {
        let _ = tx.send(welcome).await;
    }

    let mut ticks = interval_at(Instant::now() + heartbeat, heartbeat);
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if awaiting_pong {
                    tracing::warn!(connection = %id, "heartbeat unanswered, closing channel");
                    let _ = tx.send(Message::Close(None)).await;
                    break;
                }
                awaiting_pong = true;
                if tx.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
            msg = ws_receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(ClientMessage::Ping) => {
                        lock_tracker(&tracker).record_heartbeat(&id);
                        if let Some(pong) = encode(&ServerMessage::pong(Utc::now())) {
                            if tx.send(pong).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => tracing::debug!(connection = %id, error = %e, "ignoring client message"),
                },
                Some(Ok(Message::Pong(_))) => {
                    awaiting_pong = false;
                    lock_tracker(&tracker).record_heartbeat(&id);
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::warn!(connection = %id, error = %e, "channel error");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    drop(tx);
    let _ = tokio::time::timeout(FLUSH_TIMEOUT, &mut forward_task).await;
    forward_task.abort();

    let remaining = {
        let mut tracker = lock_tracker(&tracker);
        tracker.remove(&id);
        tracker.current()
    };
    tracing::info!(connection = %id, active = remaining, "channel closed");
}
