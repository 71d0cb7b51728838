//! Server error types.

use std::io;

use folio_site::BuildError;

/// Error returned by the dev server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    /// The file watcher could not be started.
    #[error("Failed to watch files: {0}")]
    Watch(#[from] notify::Error),
    /// Serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A build failed.
    #[error(transparent)]
    Build(#[from] BuildError),
}
