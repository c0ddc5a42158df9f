//! WebSocket feed delivering push notifications to the browser.
//!
//! One connection per browser session. The connection spawns two
//! tasks: a sender forwarding the broadcast feed and a receiver that
//! only watches for the close handshake — clients do not speak on
//! this channel. If either task ends, the other is aborted.

use aide::axum::ApiRouter;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::service::{EventHub, ServiceState};

/// Tracing target for the event feed.
const TRACING_TARGET: &str = "pictor_server::handler::events";

/// Upgrades the connection and attaches it to the event hub.
async fn events_feed(State(event_hub): State<EventHub>, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| stream_events(socket, event_hub))
}

async fn stream_events(socket: WebSocket, event_hub: EventHub) {
    let (mut sender, mut receiver) = socket.split();
    let mut feed = event_hub.subscribe();

    tracing::debug!(
        target: TRACING_TARGET,
        subscribers = event_hub.subscriber_count(),
        "event feed attached"
    );

    let mut send_task = tokio::spawn(async move {
        loop {
            match feed.recv().await {
                Ok(event) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        skipped,
                        "event feed lagging; dropped events"
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!(target: TRACING_TARGET, "event feed detached");
}

/// Returns an [`ApiRouter`] with the event feed route.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new().route("/events", axum::routing::get(events_feed))
}
