//! Websocket endpoint.
//!
//! Every text frame from the client is acknowledged with
//! [`ACKNOWLEDGEMENT`]. Logged-in connections additionally receive their new
//! notifications as JSON frames.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use buygenius_core::UserId;

use crate::middleware::OptionalAuth;
use crate::models::Notification;
use crate::services::notifications::NotificationEvent;
use crate::state::AppState;

/// Reply sent for every text frame.
pub const ACKNOWLEDGEMENT: &str = "Message received";

/// Frames queued for one client before senders wait.
const OUTGOING_BUFFER: usize = 64;

/// Server-pushed frame.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PushFrame<'a> {
    Notification { notification: &'a Notification },
}

/// The JSON frame to push to `user_id` for `event`, if it is theirs.
fn frame_for(event: &NotificationEvent, user_id: UserId) -> Option<String> {
    if event.user_id != user_id {
        return None;
    }
    match serde_json::to_string(&PushFrame::Notification {
        notification: &event.notification,
    }) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(error = %e, "failed to serialize notification frame");
            None
        }
    }
}

/// GET /ws
pub async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
) -> Response {
    let user_id = current.map(|u| u.id);
    let events = state.notifications().subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, user_id, events))
}

/// Forward this user's notifications into the outgoing queue.
async fn push_notifications(
    user_id: UserId,
    mut events: broadcast::Receiver<NotificationEvent>,
    tx: mpsc::Sender<Message>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(frame) = frame_for(&event, user_id) {
                    if tx.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(user_id = %user_id, skipped, "websocket client lagging, notifications dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn handle_socket(
    socket: WebSocket,
    user_id: Option<UserId>,
    events: broadcast::Receiver<NotificationEvent>,
) {
    let connection_id = Uuid::new_v4();
    info!(%connection_id, user_id = ?user_id, "websocket connected");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(OUTGOING_BUFFER);

    let outgoing = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(msg).await {
                debug!(%connection_id, error = %e, "websocket send failed");
                break;
            }
        }
    });

    let push = user_id.map(|id| tokio::spawn(push_notifications(id, events, tx.clone())));

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                debug!(%connection_id, len = text.len(), "websocket text frame");
                if tx.send(Message::Text(ACKNOWLEDGEMENT.into())).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(%connection_id, error = %e, "websocket receive failed");
                break;
            }
        }
    }

    if let Some(push) = push {
        push.abort();
    }
    drop(tx);
    outgoing.abort();

    info!(%connection_id, "websocket closed");
}
