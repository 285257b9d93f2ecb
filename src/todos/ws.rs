//! WebSocket change feed for real-time todo sync.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::model::TodoWsMessage;
use super::store::TodoStore;

/// Build the Axum router for `/ws/todos`.
pub fn todo_ws_routes(store: Arc<TodoStore>) -> Router {
    Router::new()
        .route("/ws/todos", get(ws_handler))
        .with_state(store)
}

async fn ws_handler(ws: WebSocketUpgrade, State(store): State<Arc<TodoStore>>) -> impl IntoResponse {
    info!("Todo WebSocket client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, store))
}

/// Send the full collection. Returns false if the client went away.
async fn send_sync(socket: &mut WebSocket, store: &TodoStore) -> bool {
    let todos = match store.list(None).await {
        Ok(todos) => todos,
        Err(e) => {
            warn!(error = %e, "Failed to load todos for sync");
            return true;
        }
    };
    send_json(socket, &TodoWsMessage::TodosSync { todos }).await
}

async fn send_json(socket: &mut WebSocket, msg: &TodoWsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to encode todo WS message");
            true
        }
    }
}

async fn handle_socket(mut socket: WebSocket, store: Arc<TodoStore>) {
    info!("Todo WebSocket client connected");

    // Subscribe before the initial sync so no change falls between the two.
    let mut rx = store.subscribe();

    if !send_sync(&mut socket, &store).await {
        warn!("Failed to send initial todo sync, client disconnected");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(msg) => {
                        if !send_json(&mut socket, &msg).await {
                            debug!("Todo WS client disconnected during send");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "Todo WS client lagged behind broadcast");
                        if !send_sync(&mut socket, &store).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Todo broadcast channel closed");
                        break;
                    }
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        debug!(text = %text.as_str(), "Ignoring client message on read-only todo feed");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Todo WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Todo WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("Todo WebSocket connection closed");
}
