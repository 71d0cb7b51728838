//! Page template and stylesheet.

use std::io;
use std::path::{Path, PathBuf};

const BUILTIN_TEMPLATE: &str = include_str!("../theme/page.html");
const BUILTIN_CSS: &str = include_str!("../theme/theme.css");

/// Directory holding named themes, relative to the project root.
pub const THEMES_DIR: &str = "themes";

/// Theme loading error.
#[derive(Debug, thiserror::Error)]
#[error("failed to read theme file {}: {source}", path.display())]
pub struct ThemeError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Template and CSS used for every page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    /// HTML with `{{ placeholder }}` slots.
    pub template: String,
    pub css: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Theme {
    /// The theme compiled into folio.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            template: BUILTIN_TEMPLATE.to_owned(),
            css: BUILTIN_CSS.to_owned(),
        }
    }

    /// Load `themes/<name>/` under `root_dir`.
    ///
    /// `page.html` and `theme.css` are looked up independently; whichever is
    /// missing comes from the built-in theme. Without a name the built-in
    /// theme is returned.
    pub fn load(root_dir: &Path, name: Option<&str>) -> Result<Self, ThemeError> {
        let Some(name) = name else {
            return Ok(Self::builtin());
        };

        let dir = root_dir.join(THEMES_DIR).join(name);
        if !dir.is_dir() {
            tracing::warn!(theme = name, dir = %dir.display(), "Theme not found, using built-in theme");
            return Ok(Self::builtin());
        }

        Ok(Self {
            template: read_or(&dir.join("page.html"), BUILTIN_TEMPLATE)?,
            css: read_or(&dir.join("theme.css"), BUILTIN_CSS)?,
        })
    }
}

fn read_or(path: &Path, fallback: &str) -> Result<String, ThemeError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(fallback.to_owned()),
        Err(source) => Err(ThemeError {
            path: path.to_path_buf(),
            source,
        }),
    }
}
