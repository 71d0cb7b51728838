//! Attribute parsing for `{% tag key="value" %}` tags.

use std::collections::HashMap;

/// Quoted `key="value"` / `key='value'` pairs from a legacy tag.
///
/// Keys are lower-cased so `lineNumbers` and `linenumbers` are the same
/// attribute. Anything that is not a quoted pair is skipped.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct TagAttrs {
    attrs: HashMap<String, String>,
}

impl TagAttrs {
    pub(crate) fn parse(input: &str) -> Self {
        let mut attrs = HashMap::new();
        let mut remaining = input.trim_start();

        while !remaining.is_empty() {
            if let Some((key, value, rest)) = parse_key_value(remaining) {
                attrs.insert(key.to_lowercase(), value.to_owned());
                remaining = rest.trim_start();
            } else {
                let mut chars = remaining.chars();
                chars.next();
                remaining = chars.as_str().trim_start();
            }
        }

        Self { attrs }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// Split `key="value" rest` into its parts. Values must be quoted.
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let key_len = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    if key_len == 0 {
        return None;
    }

    let (key, after_key) = s.split_at(key_len);
    let after_eq = after_key.strip_prefix('=')?;
    let quote = after_eq.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let quoted = &after_eq[1..];
    let end_quote = quoted.find(quote)?;

    Some((key, &quoted[..end_quote], &quoted[end_quote + 1..]))
}
