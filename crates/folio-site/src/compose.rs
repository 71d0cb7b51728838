//! Page chrome: sidebar, breadcrumbs, table of contents, pager and meta tags.
//!
//! Every function here is pure and returns an HTML fragment for one template
//! placeholder. Links are relative to the page being rendered, so the output
//! works from any directory depth and without a server.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

use folio_config::{I18nConfig, SiteConfig, VersionsConfig};
use folio_renderer::{TocEntry, escape_html};
use regex::{Captures, Regex};

use crate::navigation::{NavNode, Page};

/// Placeholder values for the page template.
pub type TemplateData = BTreeMap<String, String>;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// Output path for a source path: `guide/install.md` → `guide/install.html`.
#[must_use]
pub fn html_path(path: &str) -> String {
    match path.strip_suffix(".md") {
        Some(stem) => format!("{stem}.html"),
        None => path.to_owned(),
    }
}

/// Relative prefix from a page back to the site root.
///
/// `README.md` → `./`, `guide/install.md` → `../`.
#[must_use]
pub fn base_path(path: &str) -> String {
    match path.matches('/').count() {
        0 => "./".to_owned(),
        depth => "../".repeat(depth),
    }
}

/// Fill `{{ key }}` placeholders from `data`.
///
/// Unknown placeholders are left as they are. Substitution is a single pass,
/// so placeholders appearing inside substituted values are not expanded.
#[must_use]
pub fn substitute(template: &str, data: &TemplateData) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            data.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

/// Sidebar navigation with the current page marked active.
#[must_use]
pub fn sidebar(nav: &[NavNode], current: &str, base: &str) -> String {
    let mut html = String::from("<nav class=\"sidebar-nav\">\n<ul>\n");
    sidebar_items(&mut html, nav, current, base, 0);
    html.push_str("</ul>\n</nav>\n");
    html
}

fn sidebar_items(html: &mut String, nodes: &[NavNode], current: &str, base: &str, depth: usize) {
    for node in nodes {
        let is_active = node.path.as_deref() == Some(current);
        let has_children = !node.children.is_empty();
        let expanded = is_active || (has_children && node.contains(current));
        let active_class = if is_active { " active" } else { "" };
        let expanded_class = if expanded { " expanded" } else { "" };

        writeln!(html, "<li class=\"nav-item depth-{depth}{active_class}{expanded_class}\">").unwrap();
        match &node.path {
            Some(path) => {
                let link_class = if is_active { " class=\"active\"" } else { "" };
                writeln!(
                    html,
                    "  <a href=\"{base}{}\"{link_class}>{}</a>",
                    html_path(path),
                    escape_html(&node.title)
                )
                .unwrap();
            }
            None => {
                writeln!(html, "  <span class=\"nav-group-title\">{}</span>", escape_html(&node.title))
                    .unwrap();
            }
        }
        if has_children {
            writeln!(html, "  <ul class=\"nav-children{expanded_class}\">").unwrap();
            sidebar_items(html, &node.children, current, base, depth + 1);
            html.push_str("  </ul>\n");
        }
        html.push_str("</li>\n");
    }
}

/// Trail of nodes from a root down to the node for `path`.
fn trail<'a>(nodes: &'a [NavNode], path: &str) -> Option<Vec<&'a NavNode>> {
    for node in nodes {
        if node.path.as_deref() == Some(path) {
            return Some(vec![node]);
        }
        if let Some(mut rest) = trail(&node.children, path) {
            rest.insert(0, node);
            return Some(rest);
        }
    }
    None
}

/// Breadcrumbs from `Home` to the current page; empty when the page is not in
/// the navigation.
#[must_use]
pub fn breadcrumbs(nav: &[NavNode], current: &str, base: &str) -> String {
    let Some(trail) = trail(nav, current) else {
        return String::new();
    };

    let mut html = String::from("<nav class=\"breadcrumbs\" aria-label=\"Breadcrumb\">\n<ol>\n");
    writeln!(html, "  <li><a href=\"{base}index.html\">Home</a></li>").unwrap();
    let last = trail.len() - 1;
    for (idx, node) in trail.iter().enumerate() {
        let title = escape_html(&node.title);
        match &node.path {
            _ if idx == last => {
                writeln!(html, "  <li class=\"current\" aria-current=\"page\">{title}</li>").unwrap();
            }
            Some(path) => {
                writeln!(html, "  <li><a href=\"{base}{}\">{title}</a></li>", html_path(path)).unwrap();
            }
            None => writeln!(html, "  <li>{title}</li>").unwrap(),
        }
    }
    html.push_str("</ol>\n</nav>\n");
    html
}

/// "On this page" list; empty without headings.
#[must_use]
pub fn table_of_contents(headings: &[TocEntry]) -> String {
    if headings.is_empty() {
        return String::new();
    }

    let mut html = String::from("<nav class=\"toc\" aria-label=\"On this page\">\n");
    html.push_str("<h3 class=\"toc-title\">On this page</h3>\n<ul class=\"toc-list\">\n");
    for heading in headings {
        writeln!(
            html,
            "<li class=\"toc-item toc-level-{}\"><a href=\"#{}\">{}</a></li>",
            heading.level.saturating_sub(2),
            heading.id,
            escape_html(&heading.title)
        )
        .unwrap();
    }
    html.push_str("</ul>\n</nav>\n");
    html
}

/// Previous/next links in reading order.
#[must_use]
pub fn prev_next(prev: Option<&Page>, next: Option<&Page>, base: &str) -> String {
    let mut html = String::from("<div class=\"page-nav\">\n");
    match prev {
        Some(page) => {
            writeln!(html, "  <a class=\"prev\" href=\"{base}{}\">", html_path(&page.path)).unwrap();
            html.push_str("    <span class=\"arrow\">&larr;</span>\n");
            writeln!(html, "    <span class=\"label\">{}</span>", escape_html(&page.title)).unwrap();
            html.push_str("  </a>\n");
        }
        None => html.push_str("  <span class=\"prev\"></span>\n"),
    }
    match next {
        Some(page) => {
            writeln!(html, "  <a class=\"next\" href=\"{base}{}\">", html_path(&page.path)).unwrap();
            writeln!(html, "    <span class=\"label\">{}</span>", escape_html(&page.title)).unwrap();
            html.push_str("    <span class=\"arrow\">&rarr;</span>\n");
            html.push_str("  </a>\n");
        }
        None => html.push_str("  <span class=\"next\"></span>\n"),
    }
    html.push_str("</div>\n");
    html
}

/// Inputs for [`meta_tags`].
#[derive(Debug, Clone, Copy)]
pub struct PageMeta<'a> {
    pub title: &'a str,
    pub path: &'a str,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
}

/// Description, Open Graph and canonical tags.
#[must_use]
pub fn meta_tags(page: PageMeta<'_>, site: &SiteConfig) -> String {
    let mut tags = Vec::new();
    let title = if page.title.is_empty() { site.title.as_str() } else { page.title };

    if let Some(description) = page.description.filter(|d| !d.is_empty()) {
        let description = escape_html(description);
        tags.push(format!("<meta name=\"description\" content=\"{description}\">"));
        tags.push(format!("<meta property=\"og:description\" content=\"{description}\">"));
    }
    tags.push(format!("<meta property=\"og:title\" content=\"{}\">", escape_html(title)));
    tags.push("<meta property=\"og:type\" content=\"article\">".to_owned());

    if !site.url.is_empty() {
        let canonical = format!("{}/{}", site.url.trim_end_matches('/'), html_path(page.path));
        let canonical = escape_html(&canonical);
        tags.push(format!("<link rel=\"canonical\" href=\"{canonical}\">"));
        tags.push(format!("<meta property=\"og:url\" content=\"{canonical}\">"));
    }
    if !site.title.is_empty() {
        tags.push(format!(
            "<meta property=\"og:site_name\" content=\"{}\">",
            escape_html(&site.title)
        ));
    }
    if let Some(image) = page.image {
        tags.push(format!("<meta property=\"og:image\" content=\"{}\">", escape_html(image)));
    }

    tags.join("\n")
}

/// Version dropdown; empty when no versions are configured.
#[must_use]
pub fn version_switcher(versions: &VersionsConfig) -> String {
    let Some(first) = versions.list.first() else {
        return String::new();
    };
    let current = versions.current.as_deref().unwrap_or(&first.name);

    let options = versions
        .list
        .iter()
        .map(|v| (v.url.as_str(), v.name.as_str(), v.name == current));
    switcher("version", options)
}

/// Locale dropdown; empty when no locales are configured.
#[must_use]
pub fn locale_switcher(i18n: &I18nConfig) -> String {
    let Some(first) = i18n.locales.first() else {
        return String::new();
    };
    let current = i18n
        .current
        .as_deref()
        .or(i18n.default.as_deref())
        .unwrap_or(&first.code);

    let urls: Vec<String> = i18n
        .locales
        .iter()
        .map(|l| l.url.clone().unwrap_or_else(|| format!("/{}/", l.code)))
        .collect();
    let options = i18n
        .locales
        .iter()
        .zip(&urls)
        .map(|(l, url)| (url.as_str(), l.name.as_str(), l.code == current));
    switcher("locale", options)
}

fn switcher<'a>(kind: &str, options: impl Iterator<Item = (&'a str, &'a str, bool)>) -> String {
    let mut html = format!("<div class=\"{kind}-switcher\">\n");
    writeln!(
        html,
        "<select class=\"{kind}-select\" onchange=\"window.location.href=this.value\">"
    )
    .unwrap();
    for (url, label, selected) in options {
        let selected = if selected { " selected" } else { "" };
        writeln!(
            html,
            "  <option value=\"{}\"{selected}>{}</option>",
            escape_html(url),
            escape_html(label)
        )
        .unwrap();
    }
    html.push_str("</select>\n</div>\n");
    html
}
