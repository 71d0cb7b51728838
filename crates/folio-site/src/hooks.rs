//! Hook channels of the build and plugin loading.
//!
//! | Channel        | Kind    | Value           |
//! |----------------|---------|-----------------|
//! | `config`       | replace | [`SiteConfig`]  |
//! | `before_build` | mutate  | [`BuildContext`]|
//! | `summary`      | replace | `Vec<NavNode>`  |
//! | `page`         | replace | [`PageData`]    |
//! | `head`         | mutate  | `Vec<String>`   |
//! | `body_start`   | mutate  | `Vec<String>`   |
//! | `body_end`     | mutate  | `Vec<String>`   |
//! | `template`     | replace | [`TemplateData`]|
//! | `assets`       | mutate  | [`AssetsContext`]|
//! | `after_build`  | mutate  | [`BuildSummary`]|

use std::path::PathBuf;

use folio_config::{DocsConfig, SiteConfig};
use folio_hooks::{HookRegistry, LuaPlugin, MutateChannel, ReplaceChannel};
use folio_renderer::TocEntry;
use serde::{Deserialize, Serialize};

use crate::compose::TemplateData;
use crate::front_matter::FrontMatter;
use crate::navigation::{NavNode, Page};

pub const CONFIG: ReplaceChannel<SiteConfig> = ReplaceChannel::new("config");
pub const BEFORE_BUILD: MutateChannel<BuildContext> = MutateChannel::new("before_build");
pub const SUMMARY: ReplaceChannel<Vec<NavNode>> = ReplaceChannel::new("summary");
pub const PAGE: ReplaceChannel<PageData> = ReplaceChannel::new("page");
pub const HEAD: MutateChannel<Vec<String>> = MutateChannel::new("head");
pub const BODY_START: MutateChannel<Vec<String>> = MutateChannel::new("body_start");
pub const BODY_END: MutateChannel<Vec<String>> = MutateChannel::new("body_end");
pub const TEMPLATE: ReplaceChannel<TemplateData> = ReplaceChannel::new("template");
pub const ASSETS: MutateChannel<AssetsContext> = MutateChannel::new("assets");
pub const AFTER_BUILD: MutateChannel<BuildSummary> = MutateChannel::new("after_build");

/// Every channel a plugin may register against.
pub const CHANNEL_NAMES: [&str; 10] = [
    CONFIG.name(),
    BEFORE_BUILD.name(),
    SUMMARY.name(),
    PAGE.name(),
    HEAD.name(),
    BODY_START.name(),
    BODY_END.name(),
    TEMPLATE.name(),
    ASSETS.name(),
    AFTER_BUILD.name(),
];

/// Directories of the build about to start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    pub site: SiteConfig,
    pub docs_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// A rendered page before composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    pub title: String,
    /// Rendered HTML body.
    pub content: String,
    /// Source path relative to the docs directory.
    pub path: String,
    /// Source text including front-matter.
    pub raw: String,
    pub front_matter: FrontMatter,
    /// Table of contents entries.
    pub headings: Vec<TocEntry>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Handed to `assets` hooks once every page is written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsContext {
    pub output_dir: PathBuf,
}

/// Outcome of a build, handed to `after_build` hooks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub output_dir: PathBuf,
    pub pages: Vec<Page>,
    pub built: usize,
    pub skipped: usize,
}

/// Plugin scripts in load order.
///
/// `*.lua` files in the plugins directory come first, sorted by file name,
/// followed by the configured plugins in declaration order. A script listed
/// in both places loads once, at its first position.
#[must_use]
pub fn plugin_paths(docs: &DocsConfig) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/*.lua",
        glob::Pattern::escape(&docs.plugins_dir.to_string_lossy())
    );

    let mut scanned: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect(),
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "Invalid plugin directory pattern");
            Vec::new()
        }
    };
    scanned.sort();

    let mut paths: Vec<PathBuf> = Vec::with_capacity(scanned.len() + docs.plugins.len());
    for path in scanned.into_iter().chain(docs.plugins.iter().cloned()) {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// Load plugins and register their handlers.
///
/// A plugin that fails to load is logged and skipped; the build continues
/// without its hooks.
#[must_use]
pub fn load_plugins(paths: &[PathBuf]) -> HookRegistry {
    let mut registry = HookRegistry::new();
    for path in paths {
        match LuaPlugin::load(path, &CHANNEL_NAMES) {
            Ok(plugin) => {
                attach(&plugin, &mut registry);
                tracing::debug!(path = %path.display(), "Loaded plugin");
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to load plugin");
            }
        }
    }
    registry
}

/// Register a plugin's handlers on every build channel.
pub fn attach(plugin: &LuaPlugin, registry: &mut HookRegistry) {
    plugin.attach_replace(registry, CONFIG);
    plugin.attach_mutate(registry, BEFORE_BUILD);
    plugin.attach_replace(registry, SUMMARY);
    plugin.attach_replace(registry, PAGE);
    plugin.attach_mutate(registry, HEAD);
    plugin.attach_mutate(registry, BODY_START);
    plugin.attach_mutate(registry, BODY_END);
    plugin.attach_replace(registry, TEMPLATE);
    plugin.attach_mutate(registry, ASSETS);
    plugin.attach_mutate(registry, AFTER_BUILD);
}
