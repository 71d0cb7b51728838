//! Development server for Folio.
//!
//! Serves the built site, watches the project for changes and rebuilds it,
//! then tells open browser tabs to reload over a WebSocket.
//!
//! # Quick Start
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use folio_config::Config;
//! use folio_server::Server;
//!
//! let server = Server::new(Config::load(None, None)?);
//! let report = server.initial_build().await?;
//! println!("{}", report.summary());
//! server.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! notify ──► EventDebouncer ──► Build (blocking thread) ──► broadcast ──► WebSocket clients
//!
//! Browser ──HTTP──► axum ──► ServeDir(output_dir), fallback 404.html
//! ```

mod app;
mod error;
mod live_reload;
mod state;

use std::sync::Arc;

use folio_config::Config;
use folio_site::{Build, BuildOptions, BuildReport};
use tokio::sync::broadcast;

pub use error::ServerError;

use live_reload::{LiveReloadManager, Reload};
use state::AppState;

/// Development server.
pub struct Server {
    config: Arc<Config>,
    reload: broadcast::Sender<Reload>,
}

impl Server {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let (reload, _) = broadcast::channel(16);
        Self {
            config: Arc::new(config),
            reload,
        }
    }

    /// Full build with drafts and the live-reload script.
    ///
    /// Forced, since pages from an earlier `folio build` lack the script.
    pub async fn initial_build(&self) -> Result<BuildReport, ServerError> {
        let options = BuildOptions {
            force: true,
            clean: false,
            live_reload: true,
        };
        build(Arc::clone(&self.config), options).await
    }

    /// Bind, start watching and serve until Ctrl-C.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        tracing::info!(address = %addr, "Serving site");

        // Kept alive for the lifetime of the server.
        let _live_reload = if self.config.server.watch {
            let mut manager = LiveReloadManager::new(Arc::clone(&self.config), self.reload.clone());
            manager.start()?;
            Some(manager)
        } else {
            None
        };

        let state = Arc::new(AppState {
            reload: self.reload.clone(),
        });
        let app = app::create_router(&self.config.docs_resolved.output_dir, state);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Run a build on a blocking thread.
///
/// Plugins hold Lua state that cannot cross threads, so the build and its
/// hook registry are created on the worker thread.
async fn build(config: Arc<Config>, options: BuildOptions) -> Result<BuildReport, ServerError> {
    let report = tokio::task::spawn_blocking(move || Build::new(&config, options).run())
        .await
        .map_err(|e| ServerError::Io(std::io::Error::other(e)))??;
    Ok(report)
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
