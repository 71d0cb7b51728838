//! Client-side search index.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::front_matter;

static HEADING_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+[ \t]+.*$").unwrap());

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#*_`\[\]()]").unwrap());

/// One page in `assets/search-index.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub title: String,
    /// Output path (`guide/install.html`).
    pub path: String,
    /// Plain text with headings and markup punctuation removed.
    pub body: String,
}

/// Searchable text of a raw page source.
///
/// Drops front-matter and heading lines, then markdown punctuation. The same
/// function serves freshly built and unchanged pages so that an incremental
/// build yields the same index as a full one.
#[must_use]
pub fn plain_text(raw: &str) -> String {
    let (_, body) = front_matter::split(raw);
    let body = HEADING_LINE_RE.replace_all(body, "");
    MARKUP_RE.replace_all(&body, "").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_text() {
        let raw = "---\ntitle: T\n---\n# Title\n\nSome **bold** and `code`.\n\n## Sub\n\nA [link](x.md).\n";
        assert_eq!(plain_text(raw), "Some bold and code.\n\n\n\nA linkx.md.");
    }

    #[test]
    fn test_plain_text_without_markup() {
        assert_eq!(plain_text("  just words  "), "just words");
    }
}
