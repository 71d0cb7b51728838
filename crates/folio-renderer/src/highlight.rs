//! Class-based syntax highlighting for fenced code blocks.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;

use crate::util::escape_html;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Language token of a fence info string: ```` ```rust,ignore ```` → `rust`.
#[must_use]
pub fn fence_language(info: &str) -> Option<&str> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .filter(|lang| !lang.is_empty())
}

/// Whether a highlighting grammar exists for `lang`.
#[must_use]
pub fn is_known_language(lang: &str) -> bool {
    SYNTAX_SET.find_syntax_by_token(lang).is_some()
}

/// Render a code block as `<pre class="hljs"><code>`.
///
/// Known languages are tokenized into `<span>`s with space-separated scope
/// classes; unknown or missing languages fall back to escaped text.
#[must_use]
pub fn highlight_code(code: &str, lang: Option<&str>) -> String {
    let body = lang
        .and_then(|lang| highlight_spans(code, lang))
        .unwrap_or_else(|| escape_html(code));

    match lang {
        Some(lang) => format!(
            "<pre class=\"hljs\"><code class=\"language-{}\">{body}</code></pre>\n",
            escape_html(lang)
        ),
        None => format!("<pre class=\"hljs\"><code>{body}</code></pre>\n"),
    }
}

fn highlight_spans(code: &str, lang: &str) -> Option<String> {
    let syntax = SYNTAX_SET.find_syntax_by_token(lang)?;
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in code.split_inclusive('\n') {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .ok()?;
    }
    Some(generator.finalize())
}

/// A code block located in an event stream.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct CodeBlockSpan {
    /// Language declared on the fence, if any.
    pub(crate) lang: Option<String>,
    pub(crate) code: String,
    /// Index one past the closing event.
    pub(crate) end: usize,
}

/// Read the code block starting at `idx`, if one starts there.
pub(crate) fn code_block_at(events: &[Event<'_>], idx: usize) -> Option<CodeBlockSpan> {
    let Some(Event::Start(Tag::CodeBlock(kind))) = events.get(idx) else {
        return None;
    };
    let lang = match kind {
        CodeBlockKind::Fenced(info) => fence_language(info).map(str::to_owned),
        CodeBlockKind::Indented => None,
    };

    let mut code = String::new();
    for (offset, event) in events[idx + 1..].iter().enumerate() {
        match event {
            Event::Text(text) => code.push_str(text),
            Event::End(TagEnd::CodeBlock) => {
                return Some(CodeBlockSpan {
                    lang,
                    code,
                    end: idx + offset + 2,
                });
            }
            _ => return None,
        }
    }
    None
}

/// Replace every code block in the stream with highlighted HTML.
pub(crate) fn apply(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut idx = 0;
    while idx < events.len() {
        if let Some(block) = code_block_at(&events, idx) {
            let html = highlight_code(&block.code, block.lang.as_deref());
            out.push(Event::Html(CowStr::from(html)));
            idx = block.end;
        } else {
            out.push(events[idx].clone());
            idx += 1;
        }
    }
    out
}
