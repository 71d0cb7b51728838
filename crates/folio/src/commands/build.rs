//! `folio build` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::{Build, BuildOptions};

use crate::error::CliError;
use crate::output::Reporter;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Rebuild every page, ignoring the build manifest.
    #[arg(long)]
    force: bool,

    /// Delete the output directory before building (implies --force).
    #[arg(long)]
    clean: bool,

    /// Enable verbose output (per-page and plugin logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let reporter = Reporter::stderr();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        reporter.building(&config.docs_resolved.source_dir);

        let options = BuildOptions {
            force: self.force,
            clean: self.clean,
            live_reload: false,
        };
        let report = Build::new(&config, options).run()?;

        reporter.built(&report);
        Ok(())
    }
}
