//! Tabbed code: consecutive fenced blocks become one tab group.
//!
//! ````markdown
//! ```javascript
//! console.log("hi");
//! ```
//!
//! ```python
//! print("hi")
//! ```
//! ````
//!
//! Two or more adjacent fenced blocks that each declare a language are
//! replaced by a single [`TabGroup`] labeled with the language names, each
//! panel highlighted on its own. A lone block is left for the regular
//! highlighting pass.

use pulldown_cmark::{CowStr, Event};

use crate::highlight::{CodeBlockSpan, code_block_at, highlight_code};
use crate::tabs::{PanelBody, TabCounter, TabGroup};

/// Group runs of language-tagged fenced blocks in an event stream.
pub(crate) fn apply<'a>(events: Vec<Event<'a>>, counter: &mut TabCounter) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut idx = 0;

    while idx < events.len() {
        let run = collect_run(&events, idx);
        if run.len() < 2 {
            out.push(events[idx].clone());
            idx += 1;
            continue;
        }

        let end = run.last().map_or(idx + 1, |block| block.end);
        let group = run.into_iter().fold(
            TabGroup::new(counter.next_id()),
            |group, block| {
                let lang = block.lang.unwrap_or_default();
                let html = highlight_code(&block.code, Some(lang.as_str()));
                group.with_panel(lang, PanelBody::Html(html))
            },
        );
        out.push(Event::Html(CowStr::from(group.render())));
        idx = end;
    }

    out
}

/// Adjacent fenced blocks with a language, starting at `idx`.
fn collect_run(events: &[Event<'_>], mut idx: usize) -> Vec<CodeBlockSpan> {
    let mut run = Vec::new();
    while let Some(block) = code_block_at(events, idx) {
        if block.lang.is_none() {
            break;
        }
        idx = block.end;
        run.push(block);
    }
    run
}
