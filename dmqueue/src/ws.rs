//! WebSocket transport of the real-time channel

use crate::dispatcher::QueueDispatcher;
use crate::error::QueueError;
use crate::events::{ClientEvent, ServerEvent};
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Router serving `GET /ws`
pub fn create_router(dispatcher: QueueDispatcher) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(dispatcher)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(dispatcher): State<QueueDispatcher>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, dispatcher))
}

async fn handle_socket(socket: WebSocket, dispatcher: QueueDispatcher) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let session = dispatcher.connect(tx).await;

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(err) => {
                    warn!("Cannot serialize {:?}: {}", event, err);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(text.as_str()) {
                Ok(event) => {
                    dispatcher.dispatch(&session, event);
                }
                Err(err) => {
                    let err = QueueError::InvalidEvent(err.to_string());
                    debug!(session = %session.id(), "{}", err);
                    session.send(ServerEvent::error(err.user_message()));
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(session = %session.id(), "WebSocket error: {}", err);
                break;
            }
        }
    }

    dispatcher.disconnect(&session).await;
    writer.abort();
}
