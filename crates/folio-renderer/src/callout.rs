//! Callout boxes from marked blockquotes.
//!
//! A blockquote whose first paragraph starts with a type marker
//!
//! ```markdown
//! > [!WARNING] Be careful.
//! ```
//!
//! renders as a titled container instead of a `<blockquote>`:
//!
//! ```html
//! <div class="callout callout-warning"><div class="callout-title">Warning</div><div class="callout-content">
//! <p>Be careful.</p>
//! </div></div>
//! ```
//!
//! Markers are case-insensitive. Blockquotes without a recognized marker are
//! left to the default rendering.

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

/// Recognized callout types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalloutKind {
    Tip,
    Warning,
    Note,
    Info,
    Danger,
    Caution,
}

impl CalloutKind {
    /// Parse a marker name such as `WARNING` or `tip`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tip" => Some(Self::Tip),
            "warning" => Some(Self::Warning),
            "note" => Some(Self::Note),
            "info" => Some(Self::Info),
            "danger" => Some(Self::Danger),
            "caution" => Some(Self::Caution),
            _ => None,
        }
    }

    /// CSS class suffix.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Warning => "warning",
            Self::Note => "note",
            Self::Info => "info",
            Self::Danger => "danger",
            Self::Caution => "caution",
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Tip => "Tip",
            Self::Warning => "Warning",
            Self::Note => "Note",
            Self::Info => "Info",
            Self::Danger => "Danger",
            Self::Caution => "Caution",
        }
    }

    fn open_html(self) -> String {
        format!(
            "<div class=\"callout callout-{}\"><div class=\"callout-title\">{}</div><div class=\"callout-content\">\n",
            self.class(),
            self.title()
        )
    }
}

/// Split `[!KIND] rest` into the kind and the text after the marker.
fn parse_marker(text: &str) -> Option<(CalloutKind, &str)> {
    let rest = text.strip_prefix("[!")?;
    let end = rest.find(']')?;
    let kind = CalloutKind::from_name(&rest[..end])?;
    Some((kind, rest[end + 1..].trim_start()))
}

/// Rewrite marked blockquotes in an event stream.
pub(crate) fn apply(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    // One entry per open blockquote: whether it became a callout.
    let mut stack: Vec<bool> = Vec::new();
    let mut idx = 0;

    while idx < events.len() {
        if matches!(events[idx], Event::Start(Tag::BlockQuote(_))) {
            let kind = marker_at(&events, idx);
            stack.push(kind.is_some());
            if let Some(kind) = kind {
                strip_marker(&mut events, idx + 2);
                events[idx] = Event::Html(CowStr::from(kind.open_html()));
            }
        } else if matches!(events[idx], Event::End(TagEnd::BlockQuote(_)))
            && stack.pop() == Some(true)
        {
            events[idx] = Event::Html(CowStr::Borrowed("</div></div>\n"));
        }
        idx += 1;
    }

    events
}

/// Callout kind if the blockquote opened at `idx` starts with a marker.
fn marker_at(events: &[Event<'_>], idx: usize) -> Option<CalloutKind> {
    match (events.get(idx + 1), events.get(idx + 2)) {
        (Some(Event::Start(Tag::Paragraph)), Some(Event::Text(text))) => {
            parse_marker(text).map(|(kind, _)| kind)
        }
        _ => None,
    }
}

/// Remove the marker from the text event at `idx`, dropping the event (and a
/// following line break) when nothing else is left on the marker line.
fn strip_marker(events: &mut Vec<Event<'_>>, idx: usize) {
    let Some(Event::Text(text)) = events.get(idx) else {
        return;
    };
    let Some((_, rest)) = parse_marker(text) else {
        return;
    };

    if rest.is_empty() {
        events.remove(idx);
        if matches!(
            events.get(idx),
            Some(Event::SoftBreak | Event::HardBreak)
        ) {
            events.remove(idx);
        }
    } else {
        let rest = rest.to_owned();
        events[idx] = Event::Text(CowStr::from(rest));
    }
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::{Options, Parser, TextMergeStream};

    use super::*;

    fn render(markdown: &str) -> String {
        let events: Vec<_> = TextMergeStream::new(Parser::new_ext(markdown, Options::empty())).collect();
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, apply(events).into_iter());
        html
    }

    #[test]
    fn test_parse_marker() {
        assert_eq!(
            parse_marker("[!WARNING] Be careful."),
            Some((CalloutKind::Warning, "Be careful."))
        );
        assert_eq!(parse_marker("[!tip]"), Some((CalloutKind::Tip, "")));
        assert_eq!(parse_marker("[!IMPORTANT] x"), None);
        assert_eq!(parse_marker("Not a marker"), None);
    }

    #[test]
    fn test_warning_callout() {
        assert_eq!(
            render("> [!WARNING] Be careful."),
            "<div class=\"callout callout-warning\"><div class=\"callout-title\">Warning</div><div class=\"callout-content\">\n\
             <p>Be careful.</p>\n\
             </div></div>\n"
        );
    }

    #[test]
    fn test_marker_on_own_line() {
        let html = render("> [!Note]\n> Body text.");
        assert!(html.contains("callout-note"));
        assert!(html.contains("<p>Body text.</p>"));
        assert!(!html.contains("[!Note]"));
    }

    #[test]
    fn test_multi_paragraph_callout() {
        let html = render("> [!INFO] Line one.\n> \n> Line two.");
        assert!(html.contains("<p>Line one.</p>\n<p>Line two.</p>"));
        assert!(!html.contains("<blockquote>"));
    }

    #[test]
    fn test_plain_blockquote_untouched() {
        assert_eq!(
            render("> Just a quote."),
            "<blockquote>\n<p>Just a quote.</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_unknown_marker_untouched() {
        let html = render("> [!SHOUT] loud");
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("[!SHOUT] loud"));
    }

    #[test]
    fn test_nested_plain_quote_inside_callout() {
        let html = render("> [!TIP] Outer\n>\n> > inner quote");
        assert!(html.starts_with("<div class=\"callout callout-tip\">"));
        assert!(html.contains("<blockquote>\n<p>inner quote</p>\n</blockquote>"));
        assert!(html.trim_end().ends_with("</div></div>"));
    }
}
