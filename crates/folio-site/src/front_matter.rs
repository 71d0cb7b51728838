//! YAML front-matter at the top of a page.
//!
//! ```markdown
//! ---
//! title: Installing
//! description: How to install folio
//! tags: [setup]
//! draft: true
//! ---
//!
//! # Installing
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Page metadata from front-matter.
///
/// Every field is optional; keys not listed here are kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Page title (overrides the first H1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description for meta tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Excluded from production builds.
    pub draft: bool,
    /// Ordering hint for themes and plugins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Social preview image (`og:image`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Front-matter split from the page body.
#[derive(Debug, PartialEq)]
pub struct ParsedPage<'a> {
    pub front_matter: FrontMatter,
    /// Text after the closing `---`.
    pub body: &'a str,
}

/// Split `raw` into its YAML block and the remaining body.
///
/// Returns `None` for the YAML when the text does not start with a `---` line
/// or the block is never closed.
#[must_use]
pub fn split(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))
    else {
        return (None, raw);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, raw)
}

/// Parse front-matter and return it with the body.
///
/// Malformed YAML is logged and treated as empty metadata; the block is
/// still removed from the body.
#[must_use]
pub fn parse<'a>(raw: &'a str, path: &str) -> ParsedPage<'a> {
    let (yaml, body) = split(raw);
    let front_matter = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml).unwrap_or_else(|e| {
            tracing::warn!(path, error = %e, "Invalid front-matter, ignoring");
            FrontMatter::default()
        }),
        _ => FrontMatter::default(),
    };
    ParsedPage { front_matter, body }
}
