//! Tab groups: a titled set of mutually exclusive panels.
//!
//! Both the legacy `{% tabs %}` preprocessor and the tabbed-code extension
//! produce a [`TabGroup`] and render it through [`TabGroup::render`], so the
//! two paths always emit the same markup:
//!
//! ```html
//! <div class="code-tabs" data-group="tab-group-gb-0">
//! <div class="code-tab-buttons">
//! <button class="code-tab-btn active" data-tab="tab-group-gb-0-0">JavaScript</button>
//! <button class="code-tab-btn" data-tab="tab-group-gb-0-1">Python</button>
//! </div>
//! <div class="code-tab-panel active" data-panel="tab-group-gb-0-0">
//! ...
//! </div>
//! <div class="code-tab-panel" data-panel="tab-group-gb-0-1">
//! ...
//! </div>
//! </div>
//! ```

use std::fmt::Write;

use crate::util::escape_html;

/// Allocates group identifiers within one namespace.
///
/// A counter is owned by a single document-processing call, so ids restart
/// at zero for every document and two concurrent builds never share state.
#[derive(Debug)]
pub struct TabCounter {
    prefix: &'static str,
    next: usize,
}

impl TabCounter {
    /// Counter for groups written by the legacy preprocessor.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            prefix: "tab-group-gb",
            next: 0,
        }
    }

    /// Counter for groups formed from consecutive fenced code blocks.
    #[must_use]
    pub fn code() -> Self {
        Self {
            prefix: "tab-group-code",
            next: 0,
        }
    }

    /// Allocate the next group identifier.
    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    /// Number of identifiers handed out so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Panel content, either still-unrendered markdown or finished HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    /// Markdown left for the renderer. Surrounded by blank lines so that it
    /// is parsed as markdown inside the HTML block.
    Markdown(String),
    /// Already rendered HTML.
    Html(String),
}

/// One labeled panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabPanel {
    pub label: String,
    pub body: PanelBody,
}

/// A group of panels sharing one button row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGroup {
    pub id: String,
    pub panels: Vec<TabPanel>,
}

impl TabGroup {
    #[must_use]
    pub fn new(id: String) -> Self {
        Self {
            id,
            panels: Vec::new(),
        }
    }

    /// Append a panel.
    #[must_use]
    pub fn with_panel(mut self, label: impl Into<String>, body: PanelBody) -> Self {
        self.panels.push(TabPanel {
            label: label.into(),
            body,
        });
        self
    }

    /// Render the group. The first button and first panel are active.
    ///
    /// An empty group renders to an empty string.
    #[must_use]
    pub fn render(&self) -> String {
        if self.panels.is_empty() {
            return String::new();
        }

        let id = &self.id;
        let mut html = String::with_capacity(256);

        writeln!(html, r#"<div class="code-tabs" data-group="{id}">"#).unwrap();
        html.push_str("<div class=\"code-tab-buttons\">\n");
        for (idx, panel) in self.panels.iter().enumerate() {
            writeln!(
                html,
                r#"<button class="code-tab-btn{}" data-tab="{id}-{idx}">{}</button>"#,
                active_class(idx),
                escape_html(&panel.label)
            )
            .unwrap();
        }
        html.push_str("</div>\n");

        for (idx, panel) in self.panels.iter().enumerate() {
            write!(
                html,
                r#"<div class="code-tab-panel{}" data-panel="{id}-{idx}">"#,
                active_class(idx)
            )
            .unwrap();
            match &panel.body {
                PanelBody::Markdown(markdown) => {
                    write!(html, "\n\n{markdown}\n\n").unwrap();
                }
                PanelBody::Html(body) => {
                    html.push('\n');
                    html.push_str(body);
                }
            }
            html.push_str("</div>\n");
        }

        html.push_str("</div>\n");
        html
    }
}

fn active_class(idx: usize) -> &'static str {
    if idx == 0 { " active" } else { "" }
}
