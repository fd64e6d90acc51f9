use crate::infrastructure::channel::{ChannelEvent, SignalingChannel};
use crate::infrastructure::error::{P2PError, Result};
use futures::{SinkExt, Stream, StreamExt};
use peerplay_core::{PeerId, RelayFrame, SignalingMessage};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

const WELCOME_TIMEOUT: Duration = Duration::from_secs(5);

/// Signaling channel speaking [`RelayFrame`] JSON to a `peerplay-relay` over WebSocket.
///
/// Socket I/O runs on two spawned tasks; the channel itself is polled
/// synchronously like every other [`SignalingChannel`].
pub struct WsChannel {
    local_id: Option<PeerId>,
    outbound: mpsc::UnboundedSender<SignalingMessage>,
    inbound: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl WsChannel {
    /// Connect and wait for the relay to assign our id
    pub async fn connect(endpoint: &str) -> Result<Self> {
        tracing::info!("Connecting to signaling relay: {}", endpoint);

        let (stream, _) = tokio_tungstenite::connect_async(endpoint)
            .await
            .map_err(|e| P2PError::ConnectionFailed(e.to_string()))?;
        let (mut sink, mut source) = stream.split();

        let peer_id = tokio::time::timeout(WELCOME_TIMEOUT, wait_for_welcome(&mut source))
            .await
            .map_err(|_| P2PError::ConnectionFailed("Timeout waiting for peer ID".to_string()))??;

        tracing::info!("Connected with peer ID: {}", peer_id);

        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<SignalingMessage>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let _ = inbound_tx.send(ChannelEvent::Connected(peer_id.clone()));

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let kind = message.kind();
                let json = match serde_json::to_string(&RelayFrame::Signal(message)) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::warn!("Failed to encode {}: {}", kind, e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::text(json)).await {
                    tracing::warn!("Relay write failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<RelayFrame>(&text) {
                        Ok(RelayFrame::Signal(message)) => {
                            if inbound_tx.send(ChannelEvent::Message(message)).is_err() {
                                return;
                            }
                        }
                        Ok(RelayFrame::Welcome { .. }) => {
                            tracing::debug!("Ignoring repeated welcome frame");
                        }
                        Err(e) => tracing::warn!("Dropping undecodable frame: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Relay read failed: {}", e);
                        break;
                    }
                }
            }
            tracing::info!("Relay connection closed");
            let _ = inbound_tx.send(ChannelEvent::Disconnected);
        });

        Ok(Self {
            local_id: Some(peer_id),
            outbound,
            inbound,
        })
    }
}

impl SignalingChannel for WsChannel {
    fn local_peer_id(&self) -> Option<PeerId> {
        self.local_id.clone()
    }

    fn send(&mut self, message: SignalingMessage) -> Result<()> {
        if self.local_id.is_none() {
            return Err(P2PError::ChannelClosed);
        }
        tracing::debug!("Sending {}", message.kind());
        self.outbound
            .send(message)
            .map_err(|_| P2PError::ChannelClosed)
    }

    fn poll_events(&mut self) -> Vec<ChannelEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.inbound.try_recv() {
            if event == ChannelEvent::Disconnected {
                self.local_id = None;
            }
            events.push(event);
        }
        events
    }
}

async fn wait_for_welcome<S>(source: &mut S) -> Result<PeerId>
where
    S: Stream<Item = std::result::Result<Message, WsError>> + Unpin,
{
    while let Some(frame) = source.next().await {
        let frame = frame.map_err(|e| P2PError::ConnectionFailed(e.to_string()))?;
        if let Message::Text(text) = frame {
            match serde_json::from_str::<RelayFrame>(&text)? {
                RelayFrame::Welcome { peer_id } => return Ok(peer_id),
                RelayFrame::Signal(message) => {
                    tracing::debug!("Dropping {} received before welcome", message.kind());
                }
            }
        }
    }
    Err(P2PError::ConnectionFailed(
        "Relay closed before assigning an id".to_string(),
    ))
}
