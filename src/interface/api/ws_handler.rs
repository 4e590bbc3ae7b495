//! WebSocket event streaming handler
//!
//! Pushes stream lifecycle events and config notifications to the UI.

use super::state::AppState;
use crate::domain::settings::ConfigNotification;
use crate::domain::shared::events::DomainEvent;
use crate::domain::stream::StreamEvent;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Event sent to WebSocket clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BridgeEvent {
    Stream(StreamEvent),
    Config(ConfigNotification),
}

impl BridgeEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BridgeEvent::Stream(event) => event.event_type(),
            BridgeEvent::Config(notification) => notification.event_type(),
        }
    }
}

/// WebSocket handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Next event from either channel, `None` once both are closed
async fn next_event(
    stream_rx: &mut tokio::sync::broadcast::Receiver<StreamEvent>,
    config_rx: &mut tokio::sync::broadcast::Receiver<ConfigNotification>,
) -> Option<BridgeEvent> {
    loop {
        let result = tokio::select! {
            event = stream_rx.recv() => event.map(BridgeEvent::Stream),
            notification = config_rx.recv() => notification.map(BridgeEvent::Config),
        };

        match result {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                warn!("WebSocket client lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut stream_rx = state.stream.subscribe();
    let mut config_rx = state.config_store.subscribe();

    let client_id = Uuid::new_v4();
    info!("WebSocket client {} connected", client_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = next_event(&mut stream_rx, &mut config_rx).await {
            debug!("Pushing {} to client {}", event.event_type(), client_id);
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        debug!("Failed to send event to WebSocket client");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                debug!("Received close message");
                break;
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    info!("WebSocket client {} disconnected", client_id);
}
