//! Folio CLI - static documentation site generator.
//!
//! Provides commands for:
//! - `build`: Build the site, skipping pages that have not changed
//! - `serve`: Build, serve and rebuild on change with live reload
//! - `init`: Scaffold a new project

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, InitArgs, ServeArgs};
use output::Reporter;

/// Folio - static documentation site generator.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into the output directory.
    Build(BuildArgs),
    /// Start the development server with live reload.
    Serve(ServeArgs),
    /// Create a new project.
    Init(InitArgs),
}

/// Log filter for the `--verbose` flag.
const VERBOSE_FILTER: &str = "warn,folio=debug,folio_config=debug,folio_hooks=debug,folio_renderer=debug,folio_server=debug,folio_site=debug";

fn main() {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Build(args) => args.verbose,
        Commands::Serve(args) => args.verbose,
        Commands::Init(_) => false,
    };

    // RUST_LOG wins; otherwise warnings only, or debug for folio with --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Serve(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
        Commands::Init(args) => args.execute(),
    };

    if let Err(err) = result {
        Reporter::stderr().failed(&err);
        std::process::exit(1);
    }
}
