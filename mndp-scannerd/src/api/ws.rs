use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use crate::api::routes::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One task per client: forward snapshots out, read inbound frames only to
/// notice the client going away.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut subscription = state.notifier.subscribe(&state.registry);
    tracing::info!(
        "New WebSocket client connected ({} subscribers)",
        state.notifier.subscriber_count()
    );

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            changed = subscription.updates.changed() => {
                // Err means the notifier dropped us
                if changed.is_err() {
                    break;
                }

                let snapshot = subscription.updates.borrow_and_update().clone();
                let json = match serde_json::to_string(&*snapshot) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize snapshot: {}", e);
                        continue;
                    }
                };

                if let Err(e) = sender.send(Message::Text(json)).await {
                    tracing::warn!("WebSocket error: {}", e);
                    break;
                }
            }

            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket read error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.notifier.unsubscribe(subscription.id);
    let _ = sender.close().await;
    tracing::info!("WebSocket client disconnected");
}
