//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::util::rate_limit::SessionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler. Connections are anonymous guest sessions;
/// the server assigns an identity in the Welcome message.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (handle, session) = state
        .sessions
        .open(state.assets.clone(), state.ledger.clone());
    let session_id = handle.id;

    info!(session_id = %session_id, "New WebSocket connection");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Subscribe before the session task starts so the Welcome message and
    // the initial screen change are delivered
    let mut out_rx = handle.out_tx.subscribe();
    tokio::spawn(session.run());

    // Writer task: session output -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            match out_rx.recv().await {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(session_id = %session_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        session_id = %session_id,
                        lagged_count = n,
                        "Client lagged, skipping {} messages", n
                    );
                    // Continue - don't disconnect for lag
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(session_id = %session_id, "Session output channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> session task
    let rate_limiter = SessionRateLimiter::new();
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(session_id = %session_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => {
                        if handle.client_tx.send(client_msg).await.is_err() {
                            debug!(session_id = %session_id, "Session input channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(session_id = %session_id, error = %e, "Failed to parse client message");
                        let _ = handle.out_tx.send(ServerMsg::Error {
                            code: "bad_message".to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(session_id = %session_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Removing the registry entry drops the session's input sender, which
    // ends the session task and stops any running match
    state.sessions.close(&session_id);
    drop(handle);
    writer_handle.abort();

    info!(session_id = %session_id, "WebSocket connection closed");
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
