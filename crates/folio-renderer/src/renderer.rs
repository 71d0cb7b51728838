//! Markdown to HTML with the callout and tabbed-code extensions.

use pulldown_cmark::{Event, Options, Parser, TextMergeStream};

use crate::heading::{Headings, TocEntry};
use crate::tabs::TabCounter;
use crate::{callout, code_tabs, highlight};

/// Result of rendering markdown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Text of the first H1 heading.
    pub title: Option<String>,
    /// Table of contents entries (levels 2-4).
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer.
///
/// Rendering runs as passes over the parsed event stream:
///
/// 1. marked blockquotes become callouts
/// 2. runs of adjacent language-tagged fences become tab groups
/// 3. remaining code blocks are highlighted
/// 4. headings receive ids and permalinks
///
/// Each pass can be switched off independently. Raw HTML in the source is
/// passed through untouched, which the legacy preprocessor relies on.
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    gfm: bool,
    smart_punctuation: bool,
    callouts: bool,
    code_tabs: bool,
    highlighting: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with every extension enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gfm: true,
            smart_punctuation: true,
            callouts: true,
            code_tabs: true,
            highlighting: true,
        }
    }

    /// Enable or disable tables, strikethrough, task lists and footnotes.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable typographic quotes and dashes.
    #[must_use]
    pub fn with_smart_punctuation(mut self, enabled: bool) -> Self {
        self.smart_punctuation = enabled;
        self
    }

    /// Enable or disable `> [!KIND]` callouts.
    #[must_use]
    pub fn with_callouts(mut self, enabled: bool) -> Self {
        self.callouts = enabled;
        self
    }

    /// Enable or disable grouping of adjacent code fences into tabs.
    #[must_use]
    pub fn with_code_tabs(mut self, enabled: bool) -> Self {
        self.code_tabs = enabled;
        self
    }

    /// Enable or disable syntax highlighting.
    ///
    /// When disabled, code blocks use pulldown-cmark's default
    /// `<pre><code class="language-x">` output.
    #[must_use]
    pub fn with_highlighting(mut self, enabled: bool) -> Self {
        self.highlighting = enabled;
        self
    }

    /// Parser options for the current configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES;
        }
        if self.smart_punctuation {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        options
    }

    /// Render markdown text to HTML.
    ///
    /// Tab group ids restart at `tab-group-code-0` for every call.
    #[must_use]
    pub fn render(&self, markdown: &str) -> RenderResult {
        let parser = Parser::new_ext(markdown, self.parser_options());
        let mut events: Vec<Event<'_>> = TextMergeStream::new(parser).collect();

        if self.callouts {
            events = callout::apply(events);
        }
        if self.code_tabs {
            events = code_tabs::apply(events, &mut TabCounter::code());
        }
        if self.highlighting {
            events = highlight::apply(events);
        }

        let mut headings = Headings::default();
        let events = headings.apply(events);

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());

        RenderResult {
            html,
            title: headings.title,
            toc: headings.toc,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::LegacyPreprocessor;

    #[test]
    fn test_basic_document() {
        let result = MarkdownRenderer::new().render("# Hello\n\n**Bold** text");

        assert_eq!(result.title.as_deref(), Some("Hello"));
        assert!(result.toc.is_empty());
        assert!(result.html.contains("<h1 id=\"hello\">Hello"));
        assert!(result.html.contains("<p><strong>Bold</strong> text</p>"));
    }

    #[test]
    fn test_toc_slugs_match_heading_ids() {
        let result = MarkdownRenderer::new()
            .render("# Guide\n\n## Setup\n\ntext\n\n### Linux & macOS\n\n## Setup\n");

        let ids: Vec<&str> = result.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["setup", "linux-macos", "setup-1"]);
        for entry in &result.toc {
            assert!(result.html.contains(&format!("id=\"{}\"", entry.id)));
            assert!(result.html.contains(&format!("href=\"#{}\"", entry.id)));
        }
    }

    #[test]
    fn test_gfm_table() {
        let result = MarkdownRenderer::new().render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(result.html.contains("<table>"));

        let plain = MarkdownRenderer::new()
            .with_gfm(false)
            .render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(!plain.html.contains("<table>"));
    }

    #[test]
    fn test_callout_with_code_inside() {
        let result =
            MarkdownRenderer::new().render("> [!NOTE] Run this:\n>\n> ```sh\n> make\n> ```\n");

        assert!(result.html.contains("callout callout-note"));
        assert!(result.html.contains("<pre class=\"hljs\"><code class=\"language-sh\">"));
    }

    #[test]
    fn test_code_tabs_restart_per_document() {
        let renderer = MarkdownRenderer::new();
        let source = "```js\na\n```\n```py\nb\n```\n";

        let first = renderer.render(source);
        let second = renderer.render(source);

        assert!(first.html.contains("data-group=\"tab-group-code-0\""));
        assert_eq!(first.html, second.html);
    }

    #[test]
    fn test_disabled_extensions() {
        let result = MarkdownRenderer::new()
            .with_callouts(false)
            .with_code_tabs(false)
            .with_highlighting(false)
            .render("> [!TIP] hi\n\n```rust\nfn a() {}\n```\n```go\nfunc a() {}\n```\n");

        assert!(result.html.contains("<blockquote>"));
        assert!(!result.html.contains("code-tabs"));
        assert!(result.html.contains("<pre><code class=\"language-rust\">"));
    }

    #[test]
    fn test_legacy_output_renders() {
        let mut preprocessor = LegacyPreprocessor::new();
        let source = preprocessor.process(
            "{% tabs %}\n{% tab title=\"One\" %}\n**first**\n{% endtab %}\n{% tab title=\"Two\" %}\nsecond\n{% endtab %}\n{% endtabs %}\n\n{% hint style=\"danger\" %}\nStop.\n{% endhint %}\n",
        );

        let result = MarkdownRenderer::new().render(&source);

        assert!(result.html.contains("<div class=\"code-tabs\" data-group=\"tab-group-gb-0\">"));
        assert!(result.html.contains("<strong>first</strong>"));
        assert!(result.html.contains("callout callout-danger"));
        assert!(result.html.contains("<p>Stop.</p>"));
    }

    #[test]
    fn test_smart_punctuation() {
        let result = MarkdownRenderer::new().render("It's \"quoted\" -- ok");
        assert!(result.html.contains('\u{2019}'));

        let result = MarkdownRenderer::new()
            .with_smart_punctuation(false)
            .render("It's");
        assert!(result.html.contains("It's"));
    }
}
