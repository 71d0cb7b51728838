//! Terminal reporting for the `folio` commands.
//!
//! Everything goes to stderr so stdout stays free for piping.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use console::{Style, Term};
use folio_site::BuildReport;

/// What `init` did with a scaffold file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FileAction {
    Created,
    Skipped,
}

/// Writes command progress to the terminal.
pub(crate) struct Reporter {
    term: Term,
    done: Style,
    kept: Style,
    failed: Style,
    dim: Style,
    address: Style,
}

impl Reporter {
    pub(crate) fn stderr() -> Self {
        Self {
            term: Term::stderr(),
            done: Style::new().green(),
            kept: Style::new().yellow(),
            failed: Style::new().red().bold(),
            dim: Style::new().dim(),
            address: Style::new().cyan().bold(),
        }
    }

    fn line(&self, text: impl Display) {
        let _ = self.term.write_line(&text.to_string());
    }

    /// Announce which docs directory is being built.
    pub(crate) fn building(&self, source_dir: &Path) {
        self.line(self.dim.apply_to(format!("Building {}", source_dir.display())));
    }

    /// Print the one-line build summary.
    pub(crate) fn built(&self, report: &BuildReport) {
        self.line(self.done.apply_to(report.summary()));
    }

    /// Tell the user where the site is served and whether edits are picked up.
    pub(crate) fn serving(&self, url: &str, watching: bool) {
        self.line(format!("Serving at {}", self.address.apply_to(url)));
        if watching {
            self.line("Watching for changes (live reload enabled)");
        } else {
            self.line(self.dim.apply_to("File watching disabled"));
        }
    }

    /// List scaffolded files, then the next steps.
    pub(crate) fn scaffolded(&self, files: &[(PathBuf, FileAction)]) {
        for (path, action) in files {
            let label = match action {
                FileAction::Created => self.done.apply_to("created"),
                FileAction::Skipped => self.kept.apply_to("exists"),
            };
            self.line(format!("{label:>12}  {}", path.display()));
        }
        self.line("");
        self.line(self.done.apply_to("Folio project ready."));
        self.line("  docs/SUMMARY.md defines the navigation");
        self.line("  docs/README.md is the landing page");
        self.line(format!("  Preview with {}", self.address.apply_to("folio serve")));
    }

    /// Report the error that ended the command.
    pub(crate) fn failed(&self, err: impl Display) {
        self.line(format!("{} {err}", self.failed.apply_to("error:")));
    }
}
