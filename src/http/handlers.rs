use anyhow::{bail, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::AppState;
use crate::events::ServerEvent;
use crate::session::{EventSink, ListenParams, Session};
use crate::transcript::TranscriptSegment;

/// Inbound frames buffered between the socket reader and the session.
const FRAME_QUEUE_DEPTH: usize = 256;

/// GET /v1/listen
/// Upgrade to the streaming session connection. A handshake that fails at
/// the transport layer never reaches the session; that is not a
/// reportable error.
pub async fn listen(
    State(state): State<AppState>,
    Query(params): Query<ListenParams>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| handle_socket(state, params, socket))
}

async fn handle_socket(state: AppState, params: ListenParams, socket: WebSocket) {
    info!("Client connected: uid={}", params.uid);

    let (sender, mut receiver) = socket.split();
    let connected = Arc::new(AtomicBool::new(true));

    // Reader task: the only place that touches the receive half. Frames
    // flow to the session over a bounded queue; the queue closing (either
    // direction) ends both sides.
    let (frame_tx, frame_rx) = mpsc::channel::<Vec<u8>>(FRAME_QUEUE_DEPTH);
    let reader_connected = Arc::clone(&connected);
    tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Binary(data)) => {
                    if frame_tx.send(data).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    warn!("Unexpected text frame on audio connection: {}", text);
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Err(e) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
            }
        }
        reader_connected.store(false, Ordering::SeqCst);
    });

    let sink = WsEventSink::new(sender, connected);
    Session::new(params, state.deps.clone(), Box::new(sink))
        .run(frame_rx)
        .await;
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Outbound half of the client WebSocket.
struct WsEventSink {
    sender: SplitSink<WebSocket, Message>,
    connected: Arc<AtomicBool>,
}

impl WsEventSink {
    fn new(sender: SplitSink<WebSocket, Message>, connected: Arc<AtomicBool>) -> Self {
        Self { sender, connected }
    }

    async fn send_text(&mut self, payload: String) -> Result<()> {
        if self.sender.send(Message::Text(payload)).await.is_err() {
            self.connected.store(false, Ordering::SeqCst);
            bail!("websocket send failed");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventSink for WsEventSink {
    async fn send_event(&mut self, event: &ServerEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        self.send_text(payload).await
    }

    async fn send_segments(&mut self, segments: &[TranscriptSegment]) -> Result<()> {
        let payload = serde_json::to_string(segments)?;
        self.send_text(payload).await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&mut self) {
        let _ = self.sender.send(Message::Close(None)).await;
        let _ = self.sender.close().await;
        self.connected.store(false, Ordering::SeqCst);
    }
}
