use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast::error::RecvError, Mutex};
use tracing::{error, info, warn};

use crate::collab::{ConnectionId, DocumentName, SessionError};
use crate::engine::DocHub;
use crate::models::ErrorResponse;
use crate::state::AppState;
use crate::utils::ScopeGuard;

/// Map a rejected session to the HTTP answer for the upgrade request
pub fn session_rejection(e: &SessionError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        SessionError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
        SessionError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::RoomFull { .. } => StatusCode::CONFLICT,
        SessionError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ErrorResponse::new(status, e.to_string())))
}

/// Collaboration endpoint: `/collab/{roomId}::{filePath}`
///
/// The session is admitted before the upgrade so a full or unknown room is
/// refused with a plain HTTP error.
pub async fn collab_socket(
    Path(document_name): Path<String>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    let conn = ConnectionId::next();
    let session = match state.coordinator.on_connect(&document_name, conn).await {
        Ok(session) => session,
        Err(e) => return session_rejection(&e).into_response(),
    };
    let document = session.document.clone();

    // From here the registry holds a slot for `conn`; release it whether
    // the socket closes normally or the upgrade never happens.
    let coordinator = state.coordinator.clone();
    let disconnect = ScopeGuard::new(move || {
        tokio::spawn(async move {
            let mut session = session;
            coordinator.on_disconnect(&mut session).await;
        });
    });

    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub, document, conn, disconnect))
}

async fn handle_socket<F: FnOnce()>(
    socket: WebSocket,
    hub: Arc<DocHub>,
    document: DocumentName,
    conn: ConnectionId,
    _disconnect: ScopeGuard<F>,
) {
    info!("WebSocket connection established for {} with connection_id: {}", document, conn);
    let room = hub.join(&document, conn).await;

    // Subscribe before taking the snapshot so no update falls in between
    let mut updates = room.subscribe();
    let (sender, mut receiver) = socket.split();
    let sender = Arc::new(Mutex::new(sender));

    match room.snapshot() {
        Ok(snapshot) => {
            if sender.lock().await.send(Message::Binary(snapshot)).await.is_err() {
                hub.leave(&document, conn).await;
                return;
            }
        }
        Err(e) => error!("Failed to export snapshot for {}: {}", document, e),
    }

    // Forward other peers' updates to this client
    let forward_sender = sender.clone();
    let forward_room = room.clone();
    let mut forward_task = tokio::spawn(async move {
        loop {
            let bytes = match updates.recv().await {
                Ok(update) if update.from == conn => continue,
                Ok(update) => update.bytes,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(conn = %conn, skipped, "client lagged, resending snapshot");
                    match forward_room.snapshot() {
                        Ok(snapshot) => snapshot,
                        Err(e) => {
                            error!("Failed to export snapshot for lagging client: {}", e);
                            break;
                        }
                    }
                }
                Err(RecvError::Closed) => break,
            };
            if forward_sender.lock().await.send(Message::Binary(bytes)).await.is_err() {
                break;
            }
        }
    });

    // Apply this client's updates to the shared document
    let receive_room = room.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Binary(bytes) => {
                    if let Err(e) = receive_room.apply_remote(conn, bytes) {
                        warn!(conn = %conn, "Dropping update: {}", e);
                    }
                }
                Message::Text(text) if text == "ping" => {
                    if sender.lock().await.send(Message::Text("pong".to_string())).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut forward_task) => receive_task.abort(),
        _ = (&mut receive_task) => forward_task.abort(),
    };

    hub.leave(&document, conn).await;
    info!("WebSocket connection terminated for {} ({})", document, conn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rejections_map_to_distinct_statuses() {
        let cases = [
            (SessionError::InvalidIdentifier("r".into()), StatusCode::BAD_REQUEST),
            (SessionError::RoomNotFound("r".into()), StatusCode::NOT_FOUND),
            (SessionError::RoomFull { room: "r".into(), capacity: 2 }, StatusCode::CONFLICT),
            (SessionError::StoreUnavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, expected) in cases {
            let (status, Json(body)) = session_rejection(&error);
            assert_eq!(status, expected);
            assert_eq!(body.code, expected.as_u16());
            assert_eq!(body.error, error.to_string());
        }
    }
}
