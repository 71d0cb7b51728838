//! Shared router state.

use tokio::sync::broadcast;

use crate::live_reload::Reload;

pub(crate) struct AppState {
    /// Fan-out of reload signals to WebSocket clients.
    pub reload: broadcast::Sender<Reload>,
}
