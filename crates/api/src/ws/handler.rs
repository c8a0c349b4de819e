use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::StreamExt;
use intervue_services::Identity;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{extractors::auth::AuthUser, state::AppState};

/// Authenticates first; unauthenticated requests never reach the upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

async fn handle_socket(socket: WebSocket, state: AppState, identity: Identity) {
    let (sink, mut stream) = socket.split();
    let (outbox, events) = mpsc::unbounded_channel();
    let writer = tokio::spawn(super::dispatcher::write_events(sink, events));

    // Dropping the guard unregisters the connection, however this task ends.
    let guard = state.hub.connect(identity, outbox);
    let connection_id = guard.id();

    // Handlers run on their own task so a close is seen while a store call
    // is still in flight.
    let (frames, inbox) = mpsc::unbounded_channel();
    tokio::spawn(super::dispatcher::dispatch_frames(
        state.hub.clone(),
        connection_id,
        inbox,
    ));

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if frames.send(text).is_err() {
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                debug!(%connection_id, "Binary frame ignored");
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!(%connection_id, %e, "WebSocket error");
                break;
            }
            // Pings are answered by the socket itself.
            _ => {}
        }
    }

    // Peers hear of the departure now; a join still in flight finds the
    // connection gone and does nothing.
    drop(guard);
    drop(frames);
    writer.abort();
}
