//! Markdown rendering for folio documentation sites.
//!
//! Rendering a page is two steps:
//!
//! 1. [`LegacyPreprocessor`] rewrites `{% ... %}` tags from older
//!    documentation platforms into plain markdown and HTML.
//! 2. [`MarkdownRenderer`] turns the result into HTML, adding callouts,
//!    tabbed code groups, syntax highlighting and heading anchors.
//!
//! # Example
//!
//! ```
//! use folio_renderer::{LegacyPreprocessor, MarkdownRenderer};
//!
//! let source = "# Hello\n\n{% hint style=\"info\" %}\nRead me.\n{% endhint %}";
//! let markdown = LegacyPreprocessor::new().process(source);
//! let result = MarkdownRenderer::new().render(&markdown);
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains("callout callout-info"));
//! ```

mod callout;
mod code_tabs;
mod heading;
mod highlight;
mod legacy;
mod renderer;
mod tabs;
mod util;

pub use callout::CalloutKind;
pub use heading::TocEntry;
pub use highlight::{fence_language, highlight_code, is_known_language};
pub use legacy::{LegacyPreprocessor, PreprocessWarning};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use tabs::{PanelBody, TabCounter, TabGroup, TabPanel};
pub use util::{escape_html, slugify, title_from_filename};
