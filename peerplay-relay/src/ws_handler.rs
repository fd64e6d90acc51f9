use crate::state::RelayState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use peerplay_core::RelayFrame;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<RelayState>,
) -> impl IntoResponse {
    debug!("Received WebSocket upgrade request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

#[instrument(skip_all)]
async fn handle_socket(socket: WebSocket, state: RelayState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let peer_id = state.register(tx);
    info!("New WebSocket connection: {}", peer_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(message)) = receiver.next().await {
                match message {
                    Message::Text(text) => match serde_json::from_str::<RelayFrame>(&text) {
                        Ok(RelayFrame::Signal(signal)) => state.route(&peer_id, signal),
                        Ok(RelayFrame::Welcome { .. }) => {
                            warn!("Client {} sent a welcome frame, ignoring", peer_id);
                        }
                        Err(e) => warn!("Invalid frame from {}: {}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.unregister(&peer_id);
    info!("WebSocket disconnected: {}", peer_id);
}
