//! The `/__livereload` endpoint.
//!
//! Each open tab keeps one socket. After every successful rebuild the
//! server writes the text frame `reload` to all of them; the page script
//! answers by reloading itself.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::broadcast::{self, error::RecvError};

use super::Reload;
use crate::state::AppState;

const RELOAD_MESSAGE: &str = "reload";

/// Why a connected tab woke up.
enum Wake {
    Rebuilt,
    ClientFrame,
    Closed,
}

/// Upgrade to a socket subscribed to rebuilds.
///
/// The subscription is taken before the handshake so a rebuild finishing
/// during it is not missed.
pub(crate) async fn live_reload_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let rebuilds = state.reload.subscribe();
    ws.on_upgrade(move |socket| notify_rebuilds(socket, rebuilds))
}

async fn notify_rebuilds(mut socket: WebSocket, mut rebuilds: broadcast::Receiver<Reload>) {
    loop {
        let wake = tokio::select! {
            rebuilt = rebuilds.recv() => match rebuilt {
                // A tab that fell behind still needs only one reload.
                Ok(Reload) | Err(RecvError::Lagged(_)) => Wake::Rebuilt,
                Err(RecvError::Closed) => Wake::Closed,
            },
            frame = socket.recv() => match frame {
                Some(Ok(Message::Close(_)) | Err(_)) | None => Wake::Closed,
                Some(Ok(_)) => Wake::ClientFrame,
            },
        };

        match wake {
            Wake::Rebuilt => {
                if socket.send(Message::Text(RELOAD_MESSAGE.into())).await.is_err() {
                    return;
                }
            }
            Wake::ClientFrame => {}
            Wake::Closed => return,
        }
    }
}
