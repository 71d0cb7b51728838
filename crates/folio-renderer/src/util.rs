//! Shared utility functions for markdown rendering.

use pulldown_cmark::HeadingLevel;

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Convert heading text to an anchor slug.
///
/// Lower-cases the text, collapses every run of non-word characters
/// (anything but ASCII letters, digits and `_`) to one hyphen, then trims
/// hyphens from both ends. Heading anchors and sidebar hash links both go
/// through this function.
///
/// # Examples
///
/// ```
/// use folio_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started!"), "getting-started");
/// assert_eq!(slugify("  API / v2.0  "), "api-v2-0");
/// assert_eq!(slugify("snake_case"), "snake_case");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_gap = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if in_gap {
                slug.push('-');
                in_gap = false;
            }
            slug.push(c);
        } else {
            // Hyphen is deferred until the next word character, which trims
            // both ends for free.
            in_gap = !slug.is_empty();
        }
    }
    slug
}

/// Derive a human-readable title from a file name or relative path.
///
/// Strips a trailing `.md`, rewrites a `README` file name to
/// "Introduction", turns `-` and `_` into spaces and upper-cases the
/// first letter of every word.
///
/// ```
/// use folio_renderer::title_from_filename;
///
/// assert_eq!(title_from_filename("getting-started.md"), "Getting Started");
/// assert_eq!(title_from_filename("README.md"), "Introduction");
/// assert_eq!(title_from_filename("api_reference"), "Api Reference");
/// ```
#[must_use]
pub fn title_from_filename(name: &str) -> String {
    let stem = name.strip_suffix(".md").unwrap_or(name);
    let (dir, file) = match stem.rfind('/') {
        Some(pos) => (&stem[..=pos], &stem[pos + 1..]),
        None => ("", stem),
    };
    let file = if file.eq_ignore_ascii_case("readme") {
        "Introduction"
    } else {
        file
    };

    let mut title = String::with_capacity(stem.len());
    let mut at_word_start = true;
    for c in dir.chars().chain(file.chars()) {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if c.is_alphanumeric() {
            if at_word_start {
                title.extend(c.to_uppercase());
            } else {
                title.push(c);
            }
            at_word_start = false;
        } else {
            title.push(c);
            at_word_start = true;
        }
    }
    title
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("Hello,   World"), "hello-world");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn test_slugify_trims_hyphens() {
        assert_eq!(slugify("--Intro--"), "intro");
        assert_eq!(slugify("(Optional) Setup"), "optional-setup");
    }

    #[test]
    fn test_slugify_non_ascii_is_separator() {
        assert_eq!(slugify("Café Menu"), "caf-menu");
    }

    #[test]
    fn test_slugify_only_punctuation() {
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn test_title_from_filename_readme_in_directory() {
        assert_eq!(title_from_filename("guide/README.md"), "Guide/Introduction");
    }

    #[test]
    fn test_title_from_filename_keeps_inner_capitals() {
        assert_eq!(title_from_filename("using-GraphQL"), "Using GraphQL");
    }
}
