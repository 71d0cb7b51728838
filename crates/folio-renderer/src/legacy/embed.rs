//! Known embed providers for `{% embed url="..." %}`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

struct Provider {
    name: &'static str,
    pattern: Regex,
    embed: fn(&Captures<'_>) -> String,
}

/// Checked in order; the first match wins.
static PROVIDERS: LazyLock<Vec<Provider>> = LazyLock::new(|| {
    vec![
        Provider {
            name: "youtube",
            pattern: Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([a-zA-Z0-9_-]+)").unwrap(),
            embed: |caps| format!("https://www.youtube.com/embed/{}", &caps[1]),
        },
        Provider {
            name: "vimeo",
            pattern: Regex::new(r"vimeo\.com/(\d+)").unwrap(),
            embed: |caps| format!("https://player.vimeo.com/video/{}", &caps[1]),
        },
        Provider {
            name: "codepen",
            pattern: Regex::new(r"codepen\.io/([^/]+)/pen/([^/?]+)").unwrap(),
            embed: |caps| {
                format!(
                    "https://codepen.io/{}/embed/{}?default-tab=result",
                    &caps[1], &caps[2]
                )
            },
        },
        Provider {
            name: "codesandbox",
            pattern: Regex::new(r"codesandbox\.io/s/([^/?]+)").unwrap(),
            embed: |caps| format!("https://codesandbox.io/embed/{}", &caps[1]),
        },
    ]
});

/// An iframe source for a recognized provider URL.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Embed {
    pub(crate) provider: &'static str,
    pub(crate) src: String,
}

/// Resolve a page URL to an embeddable iframe source, if the host is known.
pub(crate) fn resolve(url: &str) -> Option<Embed> {
    PROVIDERS.iter().find_map(|provider| {
        provider.pattern.captures(url).map(|caps| Embed {
            provider: provider.name,
            src: (provider.embed)(&caps),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_watch_url() {
        let embed = resolve("https://www.youtube.com/watch?v=abc123").unwrap();
        assert_eq!(embed.provider, "youtube");
        assert_eq!(embed.src, "https://www.youtube.com/embed/abc123");
    }

    #[test]
    fn test_youtube_short_url_stops_at_query() {
        let embed = resolve("https://youtu.be/dQw4w9WgXcQ?t=42").unwrap();
        assert_eq!(embed.src, "https://www.youtube.com/embed/dQw4w9WgXcQ");
    }

    #[test]
    fn test_vimeo() {
        let embed = resolve("https://vimeo.com/76979871").unwrap();
        assert_eq!(embed.src, "https://player.vimeo.com/video/76979871");
    }

    #[test]
    fn test_codepen() {
        let embed = resolve("https://codepen.io/alice/pen/xyzAB?editors=1100").unwrap();
        assert_eq!(
            embed.src,
            "https://codepen.io/alice/embed/xyzAB?default-tab=result"
        );
    }

    #[test]
    fn test_codesandbox() {
        let embed = resolve("https://codesandbox.io/s/react-new").unwrap();
        assert_eq!(embed.src, "https://codesandbox.io/embed/react-new");
    }

    #[test]
    fn test_first_match_wins() {
        // A YouTube link that mentions vimeo in its query resolves as YouTube.
        let embed = resolve("https://youtube.com/watch?v=abc&ref=vimeo.com/123").unwrap();
        assert_eq!(embed.provider, "youtube");
    }

    #[test]
    fn test_unknown_host() {
        assert_eq!(resolve("https://example.com/video/1"), None);
    }
}
