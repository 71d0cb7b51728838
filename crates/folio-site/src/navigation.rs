//! Navigation tree from `SUMMARY.md` or a directory scan.
//!
//! With a summary file, every line shaped like `* [Title](path.md)` becomes
//! an entry and indentation decides nesting:
//!
//! ```markdown
//! # Summary
//!
//! * [Introduction](README.md)
//! * [Guide](guide/README.md)
//!   * [Install](guide/install.md)
//! ```
//!
//! Without one, the docs directory is scanned: `README.md` (or
//! `introduction.md`) leads each directory, remaining files follow
//! alphabetically, and subdirectories become groups, navigable when they
//! hold their own landing page.

use std::cmp::Ordering;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use folio_renderer::title_from_filename;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Navigation manifest file name inside the docs directory.
pub const SUMMARY_FILENAME: &str = "SUMMARY.md";

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)\*\s+\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// A navigation entry.
///
/// Nodes without a `path` are groups; they always have at least one
/// navigable descendant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavNode {
    pub title: String,
    /// Source path relative to the docs directory.
    pub path: Option<String>,
    #[serde(default)]
    pub children: Vec<NavNode>,
}

impl NavNode {
    /// Create a navigable leaf.
    #[must_use]
    pub fn page(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: Some(path.into()),
            children: Vec::new(),
        }
    }

    /// Whether this node or any descendant points at `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.path.as_deref() == Some(path) || self.children.iter().any(|c| c.contains(path))
    }
}

/// A navigable page in reading order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub path: String,
}

/// Load the navigation tree for `docs_dir`.
///
/// Uses `SUMMARY.md` when present, otherwise scans the directory.
pub fn load_navigation(docs_dir: &Path) -> io::Result<Vec<NavNode>> {
    let summary = docs_dir.join(SUMMARY_FILENAME);
    if summary.is_file() {
        let content = std::fs::read_to_string(&summary)?;
        return Ok(parse_summary(&content));
    }
    tracing::debug!(dir = %docs_dir.display(), "No SUMMARY.md, scanning directory");
    scan_directory(docs_dir)
}

/// Parse summary content into a forest.
///
/// An entry becomes a child of the closest preceding entry with strictly
/// less indentation. Lines that are not entries are ignored.
#[must_use]
pub fn parse_summary(content: &str) -> Vec<NavNode> {
    let mut roots = Vec::new();
    let mut stack: Vec<(usize, NavNode)> = Vec::new();

    for line in content.lines() {
        let Some(caps) = ENTRY_RE.captures(line) else {
            continue;
        };
        let indent = caps[1].chars().count();

        while stack.last().is_some_and(|(top, _)| *top >= indent) {
            close_entry(&mut stack, &mut roots);
        }
        stack.push((indent, NavNode::page(&caps[2], &caps[3])));
    }
    while !stack.is_empty() {
        close_entry(&mut stack, &mut roots);
    }

    roots
}

/// Pop the innermost open entry and attach it to its parent.
fn close_entry(stack: &mut Vec<(usize, NavNode)>, roots: &mut Vec<NavNode>) {
    let Some((_, node)) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some((_, parent)) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Build navigation from the markdown files under `docs_dir`.
pub fn scan_directory(docs_dir: &Path) -> io::Result<Vec<NavNode>> {
    scan(docs_dir, "")
}

fn scan(dir: &Path, rel: &str) -> io::Result<Vec<NavNode>> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || name == SUMMARY_FILENAME {
            continue;
        }
        if entry.file_type()?.is_dir() {
            dirs.push(name);
        } else if name.ends_with(".md") {
            files.push(name);
        }
    }

    files.sort_by(|a, b| compare_files(a, b));
    dirs.sort_by_key(|name| name.to_lowercase());

    let mut nodes: Vec<NavNode> = files
        .iter()
        .map(|name| NavNode::page(title_from_filename(name), join(rel, name)))
        .collect();

    for name in dirs {
        let sub_rel = join(rel, &name);
        let mut children = scan(&dir.join(&name), &sub_rel)?;
        if children.is_empty() {
            continue;
        }

        let leads_with_intro = children[0]
            .path
            .as_deref()
            .and_then(|path| path.strip_prefix(sub_rel.as_str()))
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(is_intro);
        let path = if leads_with_intro {
            children.remove(0).path
        } else {
            None
        };
        nodes.push(NavNode {
            title: title_from_filename(&name),
            path,
            children,
        });
    }

    Ok(nodes)
}

/// Drop groups that have no navigable descendant.
///
/// Navigation coming back from `summary` hooks goes through this so that
/// plugins cannot leave empty groups behind.
#[must_use]
pub fn prune(nodes: Vec<NavNode>) -> Vec<NavNode> {
    nodes
        .into_iter()
        .filter_map(|mut node| {
            node.children = prune(std::mem::take(&mut node.children));
            (node.path.is_some() || !node.children.is_empty()).then_some(node)
        })
        .collect()
}

/// Whether `name` is a directory's landing page.
fn is_intro(name: &str) -> bool {
    name.eq_ignore_ascii_case("README.md") || name.eq_ignore_ascii_case("introduction.md")
}

/// Landing page first, then case-insensitive alphabetical.
fn compare_files(a: &str, b: &str) -> Ordering {
    match (is_intro(a), is_intro(b)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
    }
}

fn join(rel: &str, name: &str) -> String {
    if rel.is_empty() {
        name.to_owned()
    } else {
        format!("{rel}/{name}")
    }
}

/// Flatten the tree into pages, depth-first, parents before children.
#[must_use]
pub fn flatten(nav: &[NavNode]) -> Vec<Page> {
    fn walk(nodes: &[NavNode], pages: &mut Vec<Page>) {
        for node in nodes {
            if let Some(path) = &node.path {
                pages.push(Page {
                    title: node.title.clone(),
                    path: path.clone(),
                });
            }
            walk(&node.children, pages);
        }
    }

    let mut pages = Vec::new();
    walk(nav, &mut pages);
    pages
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn depth_of(nodes: &[NavNode], title: &str, depth: usize) -> Option<usize> {
        nodes.iter().find_map(|node| {
            if node.title == title {
                Some(depth)
            } else {
                depth_of(&node.children, title, depth + 1)
            }
        })
    }

    #[test]
    fn test_single_root_with_nested_child() {
        let nav = parse_summary("* [Guide](guide.md)\n  * [Install](install.md)\n");

        assert_eq!(
            nav,
            vec![NavNode {
                title: "Guide".to_owned(),
                path: Some("guide.md".to_owned()),
                children: vec![NavNode::page("Install", "install.md")],
            }]
        );
    }

    #[test]
    fn test_indentation_defines_depth() {
        let content = "# Summary\n\n\
                       * [A](a.md)\n\
                       \x20 * [A1](a1.md)\n\
                       \x20   * [A1x](a1x.md)\n\
                       \x20 * [A2](a2.md)\n\
                       * [B](b.md)\n\
                       \x20   * [B1](b1.md)\n";

        let nav = parse_summary(content);

        assert_eq!(nav.len(), 2);
        assert_eq!(depth_of(&nav, "A", 0), Some(0));
        assert_eq!(depth_of(&nav, "A1", 0), Some(1));
        assert_eq!(depth_of(&nav, "A1x", 0), Some(2));
        assert_eq!(depth_of(&nav, "A2", 0), Some(1));
        assert_eq!(depth_of(&nav, "B1", 0), Some(1));
    }

    #[test]
    fn test_dedent_returns_to_matching_parent() {
        let nav = parse_summary(
            "* [A](a.md)\n    * [Deep](deep.md)\n  * [Mid](mid.md)\n* [B](b.md)\n",
        );

        assert_eq!(nav.len(), 2);
        let titles: Vec<&str> = nav[0].children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Deep", "Mid"]);
    }

    #[test]
    fn test_non_entry_lines_ignored() {
        let nav = parse_summary("# Summary\n\nSome prose.\n- [Dash](dash.md)\n* [Star](star.md)\n");
        assert_eq!(nav, vec![NavNode::page("Star", "star.md")]);
    }

    #[test]
    fn test_flatten_is_depth_first() {
        let nav = parse_summary(
            "* [A](a.md)\n  * [A1](a1.md)\n    * [A1x](a1x.md)\n  * [A2](a2.md)\n* [B](b.md)\n",
        );

        let order: Vec<String> = flatten(&nav).into_iter().map(|p| p.title).collect();

        assert_eq!(order, vec!["A", "A1", "A1x", "A2", "B"]);
    }

    #[test]
    fn test_flatten_skips_groups() {
        let nav = vec![NavNode {
            title: "Group".to_owned(),
            path: None,
            children: vec![NavNode::page("Child", "g/child.md")],
        }];

        assert_eq!(
            flatten(&nav),
            vec![Page {
                title: "Child".to_owned(),
                path: "g/child.md".to_owned(),
            }]
        );
    }

    #[test]
    fn test_scan_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("README.md"), "# Home").unwrap();
        fs::write(root.join("zeta.md"), "").unwrap();
        fs::write(root.join("alpha-notes.md"), "").unwrap();
        fs::write(root.join("image.png"), "").unwrap();
        fs::write(root.join(".hidden.md"), "").unwrap();
        fs::create_dir(root.join("guide")).unwrap();
        fs::write(root.join("guide/README.md"), "").unwrap();
        fs::write(root.join("guide/setup_steps.md"), "").unwrap();
        fs::create_dir(root.join("reference")).unwrap();
        fs::write(root.join("reference/api.md"), "").unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        fs::write(root.join("empty/notes.txt"), "").unwrap();

        let nav = scan_directory(root).unwrap();

        assert_eq!(
            nav,
            vec![
                NavNode::page("Introduction", "README.md"),
                NavNode::page("Alpha Notes", "alpha-notes.md"),
                NavNode::page("Zeta", "zeta.md"),
                NavNode {
                    title: "Guide".to_owned(),
                    path: Some("guide/README.md".to_owned()),
                    children: vec![NavNode::page("Setup Steps", "guide/setup_steps.md")],
                },
                NavNode {
                    title: "Reference".to_owned(),
                    path: None,
                    children: vec![NavNode::page("Api", "reference/api.md")],
                },
            ]
        );
    }

    #[test]
    fn test_scan_introduction_is_hoisted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tutorial")).unwrap();
        fs::write(dir.path().join("tutorial/basics.md"), "").unwrap();
        fs::write(dir.path().join("tutorial/introduction.md"), "").unwrap();

        let nav = scan_directory(dir.path()).unwrap();

        assert_eq!(
            nav,
            vec![NavNode {
                title: "Tutorial".to_owned(),
                path: Some("tutorial/introduction.md".to_owned()),
                children: vec![NavNode::page("Basics", "tutorial/basics.md")],
            }]
        );
    }

    #[test]
    fn test_load_prefers_summary() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("other.md"), "").unwrap();
        fs::write(dir.path().join(SUMMARY_FILENAME), "* [Only](only.md)\n").unwrap();

        let nav = load_navigation(dir.path()).unwrap();

        assert_eq!(nav, vec![NavNode::page("Only", "only.md")]);
    }

    #[test]
    fn test_contains() {
        let nav = parse_summary("* [A](a.md)\n  * [B](b.md)\n");
        assert!(nav[0].contains("b.md"));
        assert!(!nav[0].contains("c.md"));
    }

    #[test]
    fn test_prune_drops_empty_groups() {
        let group = |title: &str, children| NavNode {
            title: title.to_owned(),
            path: None,
            children,
        };
        let nav = vec![
            NavNode::page("Home", "README.md"),
            group("Empty", vec![group("Nested", Vec::new())]),
            group("Kept", vec![NavNode::page("Page", "kept/page.md")]),
        ];

        assert_eq!(
            prune(nav),
            vec![
                NavNode::page("Home", "README.md"),
                group("Kept", vec![NavNode::page("Page", "kept/page.md")]),
            ]
        );
    }
}
