use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures::{FutureExt, SinkExt, stream::SplitSink};
use intervue_services::{
    SignalingHub,
    signaling::{ConnectionId, ServerEvent},
};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Hands a connection's text frames to the hub one at a time, in arrival
/// order. A panicking handler costs only its own frame.
pub async fn dispatch_frames(
    hub: Arc<SignalingHub>,
    connection_id: ConnectionId,
    mut frames: mpsc::UnboundedReceiver<Utf8Bytes>,
) {
    while let Some(text) = frames.recv().await {
        let handled = AssertUnwindSafe(hub.handle_text(&connection_id, text.as_str()))
            .catch_unwind()
            .await;
        if handled.is_err() {
            error!(%connection_id, "Event handler panicked");
        }
    }
    debug!(%connection_id, "Frame dispatch finished");
}

/// Drains a connection's outbox onto its socket, in queue order.
pub async fn write_events(
    mut sink: SplitSink<WebSocket, Message>,
    mut events: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = events.recv().await {
        let text = match event.to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!(%e, "Failed to encode server event");
                continue;
            }
        };
        if let Err(e) = sink.send(Message::text(text)).await {
            debug!(%e, "Socket closed while sending");
            break;
        }
    }
    let _ = sink.close().await;
}
