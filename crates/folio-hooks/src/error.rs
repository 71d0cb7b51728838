//! Hook and plugin errors.

use std::path::PathBuf;

/// Error type handlers report failures with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A handler failed while a channel was being dispatched.
#[derive(Debug, thiserror::Error)]
#[error("{channel} hook from {origin} failed: {source}")]
pub struct HookError {
    /// Channel being dispatched.
    pub channel: &'static str,
    /// Who registered the handler (plugin path or a Rust label).
    pub origin: String,
    #[source]
    pub source: BoxError,
}

/// A plugin could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Plugin file could not be read.
    #[error("failed to read plugin {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Script failed to compile or raised an error while registering hooks.
    #[error("plugin {name} failed to load: {source}")]
    Script {
        name: String,
        #[source]
        source: mlua::Error,
    },
}
