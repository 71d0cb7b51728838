//! Site generation for Folio.
//!
//! This crate turns a docs directory into a static site:
//! - [`navigation`]: `SUMMARY.md` parsing and directory scanning
//! - [`front_matter`]: YAML metadata at the top of a page
//! - [`compose`]: sidebar, breadcrumbs, table of contents and template filling
//! - [`Build`]: the incremental build, driven by a [`Manifest`] of source
//!   modification times
//! - [`hooks`]: build channels and Lua plugin loading
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use folio_config::Config;
//! use folio_site::{Build, BuildOptions};
//!
//! let config = Config::load(None, None)?;
//! let report = Build::new(&config, BuildOptions::default()).run()?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

mod build;
pub mod compose;
pub mod front_matter;
pub mod hooks;
mod manifest;
pub mod navigation;
mod search;
mod theme;

pub use build::{ASSETS_DIR, Build, BuildError, BuildOptions, BuildReport, LIVE_RELOAD_PATH};
pub use front_matter::FrontMatter;
pub use manifest::{MANIFEST_FILENAME, Manifest, ManifestEntry};
pub use navigation::{NavNode, Page, SUMMARY_FILENAME};
pub use search::{SearchEntry, plain_text};
pub use theme::{THEMES_DIR, Theme, ThemeError};

pub use folio_renderer::TocEntry;
