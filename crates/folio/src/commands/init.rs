//! `folio init` command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use folio_config::CONFIG_FILENAME;
use folio_site::SUMMARY_FILENAME;

use crate::error::CliError;
use crate::output::{FileAction, Reporter};

const CONFIG_TEMPLATE: &str = r#"[site]
title = "My Documentation"

[docs]
source_dir = "docs"
output_dir = "_book"
plugins_dir = "plugins"
"#;

const SUMMARY_TEMPLATE: &str = "# Summary\n\n* [Introduction](README.md)\n";

const README_TEMPLATE: &str = "# Welcome\n\nThis is your Folio documentation. Edit the files in the `docs/` folder to get started.\n";

/// Arguments for the init command.
#[derive(Args)]
pub(crate) struct InitArgs {
    /// Project directory (default: current directory).
    dir: Option<PathBuf>,
}

impl InitArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let root = self.dir.unwrap_or_else(|| PathBuf::from("."));
        Reporter::stderr().scaffolded(&scaffold(&root)?);
        Ok(())
    }
}

/// Create the starter files under `root`, leaving existing files alone.
fn scaffold(root: &Path) -> Result<Vec<(PathBuf, FileAction)>, CliError> {
    let docs = root.join("docs");
    let plugins = root.join("plugins");
    for dir in [&docs, &plugins] {
        fs::create_dir_all(dir).map_err(|source| CliError::Io {
            path: dir.clone(),
            source,
        })?;
    }

    [
        (root.join(CONFIG_FILENAME), CONFIG_TEMPLATE),
        (docs.join(SUMMARY_FILENAME), SUMMARY_TEMPLATE),
        (docs.join("README.md"), README_TEMPLATE),
    ]
    .into_iter()
    .map(|(path, content)| {
        let action = write_new(&path, content)?;
        Ok((path, action))
    })
    .collect()
}

fn write_new(path: &Path, content: &str) -> Result<FileAction, CliError> {
    if path.exists() {
        return Ok(FileAction::Skipped);
    }
    fs::write(path, content).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FileAction::Created)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_scaffold_creates_project() {
        let dir = TempDir::new().unwrap();

        let actions = scaffold(dir.path()).unwrap();

        assert!(actions.iter().all(|(_, action)| *action == FileAction::Created));
        assert!(dir.path().join("plugins").is_dir());
        assert_eq!(
            fs::read_to_string(dir.path().join("docs/SUMMARY.md")).unwrap(),
            SUMMARY_TEMPLATE
        );
    }

    #[test]
    fn test_scaffold_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/README.md"), "# Mine\n").unwrap();

        let actions = scaffold(dir.path()).unwrap();

        assert_eq!(
            actions,
            vec![
                (dir.path().join(CONFIG_FILENAME), FileAction::Created),
                (dir.path().join("docs/SUMMARY.md"), FileAction::Created),
                (dir.path().join("docs/README.md"), FileAction::Skipped),
            ]
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("docs/README.md")).unwrap(),
            "# Mine\n"
        );
    }

    #[test]
    fn test_scaffolded_config_loads() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path()).unwrap();

        let config =
            folio_config::Config::load(Some(&dir.path().join(CONFIG_FILENAME)), None).unwrap();

        assert_eq!(config.site.title, "My Documentation");
        assert_eq!(config.docs_resolved.source_dir, dir.path().join("docs"));
    }
}
