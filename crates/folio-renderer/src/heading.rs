//! Heading anchors and table-of-contents extraction.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::util::{heading_level_to_num, slugify};

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (2-4).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// Levels that appear in the table of contents.
const TOC_LEVELS: std::ops::RangeInclusive<u8> = 2..=4;

/// Headings collected while anchoring a document.
#[derive(Debug, Default)]
pub(crate) struct Headings {
    /// Text of the first level-1 heading.
    pub(crate) title: Option<String>,
    pub(crate) toc: Vec<TocEntry>,
    id_counts: HashMap<String, usize>,
}

impl Headings {
    /// Generate a unique ID for a heading.
    fn generate_id(&mut self, text: &str) -> String {
        let mut base_id = slugify(text);
        if base_id.is_empty() {
            base_id.push_str("section");
        }
        let count = self.id_counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }

    /// Give every heading an `id` and a trailing permalink, recording the
    /// title and table of contents on the way.
    pub(crate) fn apply<'a>(&mut self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        let mut iter = events.into_iter();

        while let Some(event) = iter.next() {
            let Event::Start(Tag::Heading {
                level,
                classes,
                attrs,
                ..
            }) = event
            else {
                out.push(event);
                continue;
            };

            let mut inner = Vec::new();
            let mut text = String::new();
            for event in iter.by_ref() {
                match &event {
                    Event::End(TagEnd::Heading(_)) => break,
                    Event::Text(t) | Event::Code(t) => text.push_str(t),
                    _ => {}
                }
                inner.push(event);
            }

            let text = text.trim().to_owned();
            let id = self.generate_id(&text);
            let num = heading_level_to_num(level);

            if num == 1 && self.title.is_none() {
                self.title = Some(text.clone());
            }
            if TOC_LEVELS.contains(&num) {
                self.toc.push(TocEntry {
                    level: num,
                    title: text,
                    id: id.clone(),
                });
            }

            let permalink =
                format!(r##" <a class="header-anchor" href="#{id}" aria-hidden="true">#</a>"##);
            out.push(Event::Start(Tag::Heading {
                level,
                id: Some(CowStr::from(id)),
                classes,
                attrs,
            }));
            out.extend(inner);
            out.push(Event::InlineHtml(CowStr::from(permalink)));
            out.push(Event::End(TagEnd::Heading(level)));
        }

        out
    }
}
