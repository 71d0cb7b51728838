//! Legacy `{% tag %}` syntax preprocessing.
//!
//! Documents migrated from older toolchains embed a bracket-tag dialect:
//!
//! ```markdown
//! {% hint style="warning" %}
//! Be careful.
//! {% endhint %}
//! ```
//!
//! [`LegacyPreprocessor`] rewrites those tags into canonical markdown or HTML
//! before the markdown renderer sees the document. Transforms run in a fixed
//! order so that later ones never split blocks set up by earlier ones:
//!
//! 1. hints → callout blockquotes (`> [!WARNING] ...`)
//! 2. tabs → [`TabGroup`](crate::TabGroup) containers
//! 3. code → titled code block wrappers
//! 4. content-ref → link cards
//! 5. embed → iframes for known providers, plain links otherwise
//! 6. file → download links
//!
//! None of the output is itself a legacy tag, so running the preprocessor on
//! its own output changes nothing. Text without tags is returned unchanged.
//!
//! # Example
//!
//! ```
//! use folio_renderer::LegacyPreprocessor;
//!
//! let mut preprocessor = LegacyPreprocessor::new();
//! let output = preprocessor.process("{% hint style=\"success\" %}\nDone!\n{% endhint %}");
//! assert_eq!(output, "> [!TIP] Done!");
//! ```

mod attrs;
mod embed;

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::tabs::{PanelBody, TabCounter, TabGroup};
use crate::util::{escape_html, title_from_filename};

use attrs::TagAttrs;

static HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\{%\s*hint\s+style=["'](\w+)["']\s*%\}(.*?)\{%\s*endhint\s*%\}"#).unwrap()
});

static TABS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\{%\s*tabs\s*%\}(.*?)\{%\s*endtabs\s*%\}").unwrap());

static ENDTAB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{%\s*endtab\s*%\}").unwrap());

static TAB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\{%\s*tab\s+title=(?:"([^"]*)"|'([^']*)')\s*%\}(.*)"#).unwrap()
});

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\{%\s*code\s+(.*?)\s*%\}(.*?)\{%\s*endcode\s*%\}").unwrap()
});

static CONTENT_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)\{%\s*content-ref\s+url=["']([^"']+)["']\s*%\}(.*?)\{%\s*endcontent-ref\s*%\}"#,
    )
    .unwrap()
});

static EMBED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\{%\s*embed\s+url=["']([^"']+)["']\s*%\}"#).unwrap());

static FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\{%\s*file\s+(.*?)\s*%\}").unwrap());

/// A construct the preprocessor dropped from the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessWarning {
    /// `{% tabs %}` block without any `{% tab title=... %}` inside.
    EmptyTabGroup { group: String },
    /// `{% code %}` block with a title or line numbers but no body.
    EmptyCodeBlock { title: String },
}

impl fmt::Display for PreprocessWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTabGroup { group } => {
                write!(f, "tabs block {group} has no tabs, dropped")
            }
            Self::EmptyCodeBlock { title } if title.is_empty() => {
                write!(f, "code block has no body, dropped")
            }
            Self::EmptyCodeBlock { title } => {
                write!(f, "code block \"{title}\" has no body, dropped")
            }
        }
    }
}

/// Rewrites legacy `{% tag %}` syntax into canonical markup.
///
/// Each call to [`process`](Self::process) numbers tab groups from zero.
/// Warnings accumulate across calls until [`take_warnings`](Self::take_warnings).
#[derive(Debug, Default)]
pub struct LegacyPreprocessor {
    warnings: Vec<PreprocessWarning>,
}

impl LegacyPreprocessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite all legacy tags in `input`.
    pub fn process(&mut self, input: &str) -> String {
        let text = HINT_RE.replace_all(input, |caps: &Captures<'_>| render_hint(caps));
        let text = self.process_tabs(text);
        let text = self.process_code_blocks(text);
        let text = replace(text, &CONTENT_REF_RE, render_content_ref);
        let text = replace(text, &EMBED_RE, render_embed);
        let text = replace(text, &FILE_RE, render_file);
        text.into_owned()
    }

    /// Warnings collected so far.
    #[must_use]
    pub fn warnings(&self) -> &[PreprocessWarning] {
        &self.warnings
    }

    /// Drain collected warnings.
    pub fn take_warnings(&mut self) -> Vec<PreprocessWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn process_tabs<'a>(&mut self, text: Cow<'a, str>) -> Cow<'a, str> {
        let mut counter = TabCounter::legacy();
        let warnings = &mut self.warnings;
        replace(text, &TABS_RE, |caps| {
            let mut group = TabGroup::new(counter.next_id());
            for part in ENDTAB_RE.split(&caps[1]) {
                if let Some(tab) = TAB_RE.captures(part) {
                    let title = tab.get(1).or_else(|| tab.get(2)).map_or("", |m| m.as_str());
                    let body = PanelBody::Markdown(tab[3].trim().to_owned());
                    group = group.with_panel(title, body);
                }
            }
            if group.panels.is_empty() {
                warnings.push(PreprocessWarning::EmptyTabGroup { group: group.id });
                return String::new();
            }
            group.render()
        })
    }

    fn process_code_blocks<'a>(&mut self, text: Cow<'a, str>) -> Cow<'a, str> {
        let warnings = &mut self.warnings;
        replace(text, &CODE_RE, |caps| {
            let attrs = TagAttrs::parse(&caps[1]);
            let title = attrs.get("title").unwrap_or_default();
            let line_numbers = attrs.get("linenumbers") == Some("true");
            let body = caps[2].trim();

            if title.is_empty() && !line_numbers {
                return body.to_owned();
            }
            if body.is_empty() {
                warnings.push(PreprocessWarning::EmptyCodeBlock {
                    title: title.to_owned(),
                });
                return String::new();
            }

            let mut html = String::with_capacity(body.len() + 128);
            html.push_str(r#"<div class="code-block-titled""#);
            if line_numbers {
                html.push_str(r#" data-line-numbers="true""#);
            }
            html.push_str(">\n");
            if !title.is_empty() {
                writeln!(
                    html,
                    r#"<div class="code-block-title">{}</div>"#,
                    escape_html(title)
                )
                .unwrap();
            }
            write!(html, "\n{body}\n\n</div>\n").unwrap();
            html
        })
    }
}

/// Apply a regex replacement, borrowing when nothing matched.
fn replace<'a>(
    text: Cow<'a, str>,
    re: &Regex,
    mut render: impl FnMut(&Captures<'_>) -> String,
) -> Cow<'a, str> {
    match text {
        Cow::Borrowed(s) => re.replace_all(s, |caps: &Captures<'_>| render(caps)),
        Cow::Owned(s) => {
            let replaced = match re.replace_all(&s, |caps: &Captures<'_>| render(caps)) {
                Cow::Borrowed(_) => None,
                Cow::Owned(replaced) => Some(replaced),
            };
            Cow::Owned(replaced.unwrap_or(s))
        }
    }
}

fn render_hint(caps: &Captures<'_>) -> String {
    let style = caps[1].to_lowercase();
    let kind = match style.as_str() {
        "success" => "tip",
        other => other,
    }
    .to_uppercase();

    let mut quoted = String::with_capacity(caps[2].len() + 16);
    for (idx, line) in caps[2].trim().split('\n').enumerate() {
        if idx == 0 {
            write!(quoted, "> [!{kind}] {line}").unwrap();
        } else {
            write!(quoted, "\n> {line}").unwrap();
        }
    }
    quoted
}

fn render_content_ref(caps: &Captures<'_>) -> String {
    let url = &caps[1];
    let body = caps[2].trim();
    let link = if body.is_empty() {
        Cow::Owned(format!("[{}]({url})", title_from_filename(url)))
    } else {
        Cow::Borrowed(body)
    };
    format!("<div class=\"content-ref\">\n\n{link}\n\n</div>\n")
}

fn render_embed(caps: &Captures<'_>) -> String {
    let url = &caps[1];
    match embed::resolve(url) {
        Some(embed) => format!(
            "<div class=\"embed-container\">\n<iframe src=\"{}\" data-provider=\"{}\" frameborder=\"0\" allowfullscreen style=\"width:100%;aspect-ratio:16/9;\"></iframe>\n</div>\n",
            escape_html(&embed.src),
            embed.provider
        ),
        None => {
            let url = escape_html(url);
            format!(
                "<div class=\"embed-link\">\n<a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">{url}</a>\n</div>\n"
            )
        }
    }
}

fn render_file(caps: &Captures<'_>) -> String {
    let attrs = TagAttrs::parse(&caps[1]);
    let src = attrs.get("src").unwrap_or_default();
    if src.is_empty() {
        return String::new();
    }

    let caption = attrs
        .get("caption")
        .filter(|caption| !caption.is_empty())
        .or_else(|| src.rsplit('/').next().filter(|name| !name.is_empty()))
        .unwrap_or("Download file");

    format!(
        "<div class=\"file-download\">\n<a href=\"{}\" download>{}</a>\n</div>\n",
        escape_html(src),
        escape_html(caption)
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn preprocess(input: &str) -> String {
        LegacyPreprocessor::new().process(input)
    }

    #[test]
    fn test_hint_warning() {
        let output = preprocess("{% hint style=\"warning\" %}\nBe careful.\n{% endhint %}");
        assert!(output.contains("> [!WARNING] Be careful."));
        assert!(!output.contains("{%"));
        assert!(!output.contains("%}"));
    }

    #[test]
    fn test_hint_multiline_body() {
        let output = preprocess(
            "{% hint style='info' %}\nLine one.\n\nLine two.\n{% endhint %}",
        );
        assert_eq!(output, "> [!INFO] Line one.\n> \n> Line two.");
    }

    #[test]
    fn test_hint_style_mapping() {
        assert_eq!(
            preprocess("{% hint style=\"success\" %}ok{% endhint %}"),
            "> [!TIP] ok"
        );
        assert_eq!(
            preprocess("{% hint style=\"DANGER\" %}no{% endhint %}"),
            "> [!DANGER] no"
        );
        assert_eq!(
            preprocess("{% hint style=\"custom\" %}x{% endhint %}"),
            "> [!CUSTOM] x"
        );
    }

    #[test]
    fn test_tabs_two_panels() {
        let input = "{% tabs %}\n{% tab title=\"JavaScript\" %}\n```js\nlet x = 1;\n```\n{% endtab %}\n{% tab title='Python' %}\n```python\nx = 1\n```\n{% endtab %}\n{% endtabs %}";
        let output = preprocess(input);

        assert!(output.starts_with("<div class=\"code-tabs\" data-group=\"tab-group-gb-0\">\n"));
        assert!(output.contains(
            "<button class=\"code-tab-btn active\" data-tab=\"tab-group-gb-0-0\">JavaScript</button>"
        ));
        assert!(output.contains(
            "<button class=\"code-tab-btn\" data-tab=\"tab-group-gb-0-1\">Python</button>"
        ));
        assert!(output.contains(
            "<div class=\"code-tab-panel active\" data-panel=\"tab-group-gb-0-0\">\n\n```js\nlet x = 1;\n```\n\n</div>"
        ));
        assert!(output.contains("data-panel=\"tab-group-gb-0-1\""));
        assert!(!output.contains("{%"));
    }

    #[test]
    fn test_tab_group_ids_restart_per_call() {
        let input = "{% tabs %}{% tab title=\"A\" %}a{% endtab %}{% endtabs %}\n\n{% tabs %}{% tab title=\"B\" %}b{% endtab %}{% endtabs %}";
        let mut preprocessor = LegacyPreprocessor::new();

        let first = preprocessor.process(input);
        let second = preprocessor.process(input);

        assert!(first.contains("tab-group-gb-0"));
        assert!(first.contains("tab-group-gb-1"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_tab_group_is_dropped() {
        let mut preprocessor = LegacyPreprocessor::new();
        let output = preprocessor.process("before\n{% tabs %}\nno tabs here\n{% endtabs %}\nafter");

        assert_eq!(output, "before\n\nafter");
        assert_eq!(
            preprocessor.warnings(),
            &[PreprocessWarning::EmptyTabGroup {
                group: "tab-group-gb-0".to_owned()
            }]
        );
    }

    #[test]
    fn test_code_without_attributes_unwraps() {
        let output = preprocess("{% code %}\n```rust\nfn main() {}\n```\n{% endcode %}");
        assert_eq!(output, "```rust\nfn main() {}\n```");
    }

    #[test]
    fn test_code_with_title() {
        let output =
            preprocess("{% code title=\"app.js\" lineNumbers=\"true\" %}\n```js\nrun();\n```\n{% endcode %}");
        assert_eq!(
            output,
            "<div class=\"code-block-titled\" data-line-numbers=\"true\">\n\
             <div class=\"code-block-title\">app.js</div>\n\
             \n```js\nrun();\n```\n\n</div>\n"
        );
    }

    #[test]
    fn test_code_with_title_but_no_body_is_dropped() {
        let mut preprocessor = LegacyPreprocessor::new();
        let output = preprocessor.process("{% code title=\"empty.rs\" %}\n\n{% endcode %}");

        assert_eq!(output, "");
        assert_eq!(preprocessor.take_warnings().len(), 1);
        assert!(preprocessor.warnings().is_empty());
    }

    #[test]
    fn test_content_ref_keeps_body() {
        let output = preprocess(
            "{% content-ref url=\"setup.md\" %}\n[Setup guide](setup.md)\n{% endcontent-ref %}",
        );
        assert_eq!(
            output,
            "<div class=\"content-ref\">\n\n[Setup guide](setup.md)\n\n</div>\n"
        );
    }

    #[test]
    fn test_content_ref_synthesizes_link() {
        let output =
            preprocess("{% content-ref url=\"getting-started.md\" %}\n{% endcontent-ref %}");
        assert!(output.contains("[Getting Started](getting-started.md)"));
    }

    #[test]
    fn test_embed_youtube() {
        let output = preprocess("{% embed url=\"https://www.youtube.com/watch?v=abc123\" %}");
        assert!(output.contains("<iframe src=\"https://www.youtube.com/embed/abc123\""));
    }

    #[test]
    fn test_embed_unknown_host_is_link() {
        let output = preprocess("{% embed url=\"https://example.com/demo\" %}");
        assert!(!output.contains("<iframe"));
        assert!(output.contains(
            "<a href=\"https://example.com/demo\" target=\"_blank\" rel=\"noopener noreferrer\">https://example.com/demo</a>"
        ));
    }

    #[test]
    fn test_file_default_caption() {
        let output = preprocess("{% file src=\".gitbook/assets/report.pdf\" %}");
        assert_eq!(
            output,
            "<div class=\"file-download\">\n<a href=\".gitbook/assets/report.pdf\" download>report.pdf</a>\n</div>\n"
        );
    }

    #[test]
    fn test_file_caption_and_missing_src() {
        assert!(
            preprocess("{% file src='a.zip' caption=\"Get it\" %}")
                .contains(">Get it</a>")
        );
        assert_eq!(preprocess("{% file caption=\"x\" %}"), "");
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let input = "# Title\n\nSome `{ %` text with {braces} and % signs.\n\n```\n{{ not a tag }}\n```\n";
        assert_eq!(preprocess(input), input);
    }

    #[test]
    fn test_idempotent() {
        let input = "{% hint style=\"info\" %}\nNote\n{% endhint %}\n\n\
            {% tabs %}\n{% tab title=\"A\" %}\n{% code title=\"a.sh\" %}\n```sh\nls\n```\n{% endcode %}\n{% endtab %}\n{% endtabs %}\n\n\
            {% content-ref url=\"x.md\" %}{% endcontent-ref %}\n\
            {% embed url=\"https://vimeo.com/1\" %}\n\
            {% embed url=\"https://example.com\" %}\n\
            {% file src=\"f/report.pdf\" %}\n";
        let once = preprocess(input);
        let twice = preprocess(&once);

        assert_eq!(once, twice);
        assert!(!once.contains("{%"));
    }

    #[test]
    fn test_warning_display() {
        let warning = PreprocessWarning::EmptyCodeBlock {
            title: "main.rs".to_owned(),
        };
        assert_eq!(warning.to_string(), "code block \"main.rs\" has no body, dropped");
    }
}
