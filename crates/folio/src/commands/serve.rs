//! `folio serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_server::Server;

use crate::error::CliError;
use crate::output::Reporter;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long, env = "FOLIO_HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "FOLIO_PORT")]
    port: Option<u16>,

    /// Do not watch files or rebuild on change.
    #[arg(long)]
    no_watch: bool,

    /// Enable verbose output (per-page, watcher and plugin logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// Builds once, then serves until interrupted.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let reporter = Reporter::stderr();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            watch: self.no_watch.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let url = format!("http://{}:{}", config.server.host, config.server.port);
        let watch = config.server.watch;

        let server = Server::new(config);
        let report = server.initial_build().await?;
        reporter.built(&report);
        reporter.serving(&url, watch);

        server.run().await?;
        Ok(())
    }
}
