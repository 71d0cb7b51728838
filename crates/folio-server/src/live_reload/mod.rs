//! Live reload: file watching, rebuilds and browser notification.

mod debouncer;
mod manager;
mod websocket;

pub(crate) use manager::{LiveReloadManager, Reload};
pub(crate) use websocket::live_reload_socket;
