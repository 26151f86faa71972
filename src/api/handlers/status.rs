//! Live status socket
//!
//! Each connection opens one broadcaster channel for its client id and
//! forwards every [`StatusEvent`](crate::status::StatusEvent) as a JSON text
//! frame until either side goes away.

use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};

pub async fn status_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| forward_status(socket, state, client_id))
}

async fn forward_status(socket: WebSocket, state: AppState, client_id: String) {
    let broadcaster = state.broadcaster;
    let mut subscription = broadcaster.subscribe(&client_id);
    let channel_id = subscription.channel_id();
    tracing::info!(subscriber_id = %client_id, channel = channel_id, "status socket connected");

    let (mut sender, mut receiver) = socket.split();

    // Drain client frames so pings are answered and a close is noticed
    let mut inbound = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let frame = match serde_json::to_string(&event) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!(
                            subscriber_id = %client_id,
                            error = %e,
                            "unserializable status event"
                        );
                        continue;
                    }
                };
                if sender.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            _ = &mut inbound => break,
        }
    }

    inbound.abort();
    broadcaster.unsubscribe(&client_id, channel_id);
    tracing::info!(subscriber_id = %client_id, channel = channel_id, "status socket disconnected");
}
