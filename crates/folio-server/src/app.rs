//! Router construction.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use folio_site::LIVE_RELOAD_PATH;
use tower_http::services::{ServeDir, ServeFile};

use crate::live_reload;
use crate::state::AppState;

/// Create the application router.
///
/// Serves the built site from `output_dir`. Unknown paths get `404.html`
/// with a 404 status.
pub(crate) fn create_router(output_dir: &Path, state: Arc<AppState>) -> Router {
    let not_found = ServeFile::new(output_dir.join("404.html"));
    let static_files = ServeDir::new(output_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found);

    Router::new()
        .route(LIVE_RELOAD_PATH, get(live_reload::live_reload_socket))
        .fallback_service(static_files)
        .with_state(state)
}
