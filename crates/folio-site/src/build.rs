//! Incremental site build.
//!
//! [`Build::run`] walks the flattened navigation in order. Each page is
//! either skipped because its source is missing or a production draft,
//! reused from the manifest because its modification time is unchanged, or
//! rendered, composed and written. The manifest and the search index are
//! written once every page is done.

use std::fmt::Write;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use folio_config::{Config, SiteConfig};
use folio_hooks::{HookError, HookRegistry};
use folio_renderer::{LegacyPreprocessor, MarkdownRenderer, escape_html};

use crate::compose::{self, PageMeta, TemplateData};
use crate::front_matter;
use crate::hooks::{self, AssetsContext, BuildContext, BuildSummary, PageData};
use crate::manifest::{self, Manifest, ManifestEntry};
use crate::navigation::{self, NavNode, Page};
use crate::search::{self, SearchEntry};
use crate::theme::{Theme, ThemeError};

/// Directory for generated assets inside the output directory.
pub const ASSETS_DIR: &str = "assets";

/// WebSocket path pages connect to in live-reload mode.
pub const LIVE_RELOAD_PATH: &str = "/__livereload";

const LIVE_RELOAD_SCRIPT: &str = r#"<script>
(() => {
  const scheme = location.protocol === "https:" ? "wss" : "ws";
  const socket = new WebSocket(`${scheme}://${location.host}/__livereload`);
  socket.addEventListener("message", (event) => {
    if (event.data === "reload") location.reload();
  });
})();
</script>"#;

const NOT_FOUND_CONTENT: &str = "<h1>Page not found</h1>\n<p>The page you are looking for does not exist. <a href=\"/\">Go to the home page</a>.</p>\n";

/// Build error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Reading sources or writing output failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A hook handler failed.
    #[error(transparent)]
    Hook(#[from] HookError),
    /// The configured theme could not be read.
    #[error(transparent)]
    Theme(#[from] ThemeError),
    /// The search index could not be serialized.
    #[error("Failed to serialize search index: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> BuildError + '_ {
    move |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Options for one build run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Ignore the manifest and rebuild every page.
    pub force: bool,
    /// Remove the output directory first. Implies `force`.
    pub clean: bool,
    /// Include drafts and inject the live-reload script.
    pub live_reload: bool,
}

/// Result of a successful build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages rendered in this run.
    pub built: usize,
    /// Pages reused from the previous run.
    pub skipped: usize,
    pub output_dir: PathBuf,
}

impl BuildReport {
    /// One-line summary for the user.
    #[must_use]
    pub fn summary(&self) -> String {
        let out = self.output_dir.display();
        if self.skipped > 0 {
            format!(
                "Build complete! {} pages built, {} unchanged (incremental) -> {out}/",
                self.built, self.skipped
            )
        } else {
            format!("Build complete! {} pages written to {out}/", self.built)
        }
    }
}

/// What happened to one page.
enum Outcome {
    Missing,
    Draft,
    Unchanged(ManifestEntry, SearchEntry),
    Built(ManifestEntry, SearchEntry),
}

/// Per-run values shared by every page.
struct Site<'a> {
    config: &'a SiteConfig,
    nav: &'a [NavNode],
    pages: &'a [Page],
    theme: &'a Theme,
    version_switcher: String,
    locale_switcher: String,
}

/// A configured build.
///
/// Holds the hook registry for the run. The registry is not `Send`, so a
/// `Build` is created on the thread that runs it.
pub struct Build<'a> {
    config: &'a Config,
    options: BuildOptions,
    registry: HookRegistry,
    renderer: MarkdownRenderer,
}

impl<'a> Build<'a> {
    /// Create a build and load the configured plugins.
    #[must_use]
    pub fn new(config: &'a Config, options: BuildOptions) -> Self {
        let paths = hooks::plugin_paths(&config.docs_resolved);
        Self::with_registry(config, options, hooks::load_plugins(&paths))
    }

    /// Create a build with an existing hook registry.
    #[must_use]
    pub fn with_registry(config: &'a Config, options: BuildOptions, registry: HookRegistry) -> Self {
        Self {
            config,
            options,
            registry,
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Registry for adding handlers before [`run`](Self::run).
    pub fn registry_mut(&mut self) -> &mut HookRegistry {
        &mut self.registry
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Returns an error if an output file cannot be written, a source cannot
    /// be read, or a hook handler fails. The manifest is only written when
    /// every page succeeded.
    pub fn run(&self) -> Result<BuildReport, BuildError> {
        let started = Instant::now();
        let docs = &self.config.docs_resolved;
        let output_dir = &docs.output_dir;

        let site_config = self.registry.replace(hooks::CONFIG, self.config.site.clone())?;

        let mut context = BuildContext {
            site: site_config.clone(),
            docs_dir: docs.source_dir.clone(),
            output_dir: output_dir.clone(),
        };
        self.registry.mutate(hooks::BEFORE_BUILD, &mut context)?;

        let nav = navigation::load_navigation(&docs.source_dir).map_err(io_error(&docs.source_dir))?;
        let nav = navigation::prune(self.registry.replace(hooks::SUMMARY, nav)?);
        let pages = navigation::flatten(&nav);

        if self.options.clean && output_dir.exists() {
            tracing::debug!(dir = %output_dir.display(), "Removing output directory");
            fs::remove_dir_all(output_dir).map_err(io_error(output_dir))?;
        }
        let assets_dir = output_dir.join(ASSETS_DIR);
        fs::create_dir_all(&assets_dir).map_err(io_error(&assets_dir))?;

        let theme = Theme::load(&docs.root_dir, site_config.theme.as_deref())?;
        write(&assets_dir.join("theme.css"), &theme.css)?;

        let previous = if self.options.force || self.options.clean {
            Manifest::new()
        } else {
            let manifest = Manifest::load(output_dir);
            tracing::debug!(entries = manifest.len(), "Loaded build manifest");
            manifest
        };

        let site = Site {
            config: &site_config,
            nav: &nav,
            pages: &pages,
            theme: &theme,
            version_switcher: self
                .config
                .versions
                .as_ref()
                .map(compose::version_switcher)
                .unwrap_or_default(),
            locale_switcher: self
                .config
                .i18n
                .as_ref()
                .map(compose::locale_switcher)
                .unwrap_or_default(),
        };

        let mut manifest = Manifest::new();
        let mut search_index = Vec::with_capacity(pages.len());
        let mut built = 0;
        let mut skipped = 0;

        for (index, page) in pages.iter().enumerate() {
            match self.build_page(&site, index, &previous)? {
                Outcome::Missing | Outcome::Draft => {}
                Outcome::Unchanged(entry, search) => {
                    manifest.insert(page.path.clone(), entry);
                    search_index.push(search);
                    skipped += 1;
                }
                Outcome::Built(entry, search) => {
                    manifest.insert(page.path.clone(), entry);
                    search_index.push(search);
                    built += 1;
                }
            }
        }

        let index_path = assets_dir.join("search-index.json");
        write(&index_path, &serde_json::to_string(&search_index)?)?;

        let mut assets = AssetsContext {
            output_dir: output_dir.clone(),
        };
        self.registry.mutate(hooks::ASSETS, &mut assets)?;

        self.write_extras(&site, output_dir)?;

        manifest.save(output_dir).map_err(io_error(output_dir))?;

        let mut summary = BuildSummary {
            output_dir: output_dir.clone(),
            pages,
            built,
            skipped,
        };
        self.registry.mutate(hooks::AFTER_BUILD, &mut summary)?;

        tracing::info!(
            built,
            skipped,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Build complete"
        );

        Ok(BuildReport {
            built,
            skipped,
            output_dir: output_dir.clone(),
        })
    }

    fn build_page(&self, site: &Site<'_>, index: usize, previous: &Manifest) -> Result<Outcome, BuildError> {
        let page = &site.pages[index];
        let source = self.config.docs_resolved.source_dir.join(&page.path);

        let metadata = match fs::metadata(&source) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                tracing::warn!(path = %page.path, "Page source is not a file, skipping");
                return Ok(Outcome::Missing);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %page.path, "Page source not found, skipping");
                return Ok(Outcome::Missing);
            }
            Err(source_err) => return Err(io_error(&source)(source_err)),
        };
        let mtime = manifest::mtime_nanos(&metadata);
        let raw = fs::read_to_string(&source).map_err(io_error(&source))?;
        let parsed = front_matter::parse(&raw, &page.path);

        let output_path = self.config.docs_resolved.output_dir.join(compose::html_path(&page.path));
        if parsed.front_matter.draft && !self.options.live_reload {
            tracing::debug!(path = %page.path, "Skipping draft");
            // A previous live-reload build may have written it.
            if output_path.is_file() {
                fs::remove_file(&output_path).map_err(io_error(&output_path))?;
            }
            return Ok(Outcome::Draft);
        }

        if let Some(entry) = previous.fresh(&page.path, mtime).filter(|_| output_path.is_file()) {
            tracing::debug!(path = %page.path, "Unchanged");
            let search = SearchEntry {
                title: entry.title.clone(),
                path: compose::html_path(&page.path),
                body: search::plain_text(&raw),
            };
            return Ok(Outcome::Unchanged(entry.clone(), search));
        }

        tracing::debug!(path = %page.path, "Building page");

        let mut preprocessor = LegacyPreprocessor::new();
        let markdown = preprocessor.process(parsed.body);
        for warning in preprocessor.take_warnings() {
            tracing::debug!(path = %page.path, %warning, "Legacy syntax dropped");
        }

        let rendered = self.renderer.render(&markdown);
        let front_matter = parsed.front_matter;
        let title = front_matter
            .title
            .clone()
            .or(rendered.title)
            .unwrap_or_else(|| page.title.clone());

        let data = PageData {
            title,
            content: rendered.html,
            path: page.path.clone(),
            raw: raw.clone(),
            description: front_matter.description.clone(),
            tags: front_matter.tags.clone(),
            front_matter,
            headings: rendered.toc,
        };
        let data = self.registry.replace(hooks::PAGE, data)?;

        let html = self.compose(site, index, &data)?;
        let html = if site.config.minify {
            minify(html, &page.path)
        } else {
            html
        };

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        write(&output_path, &html)?;

        let entry = ManifestEntry {
            mtime,
            title: data.title.clone(),
        };
        let search = SearchEntry {
            title: data.title,
            path: compose::html_path(&page.path),
            body: search::plain_text(&raw),
        };
        Ok(Outcome::Built(entry, search))
    }

    /// Assemble the final HTML for a rendered page.
    fn compose(&self, site: &Site<'_>, index: usize, data: &PageData) -> Result<String, BuildError> {
        let page = &site.pages[index];
        let base = compose::base_path(&page.path);

        let mut head = Vec::new();
        let mut body_start = Vec::new();
        let mut body_end = Vec::new();
        self.registry.mutate(hooks::HEAD, &mut head)?;
        self.registry.mutate(hooks::BODY_START, &mut body_start)?;
        self.registry.mutate(hooks::BODY_END, &mut body_end)?;
        head.push(compose::meta_tags(
            PageMeta {
                title: &data.title,
                path: &page.path,
                description: data.description.as_deref(),
                image: data.front_matter.image.as_deref(),
            },
            site.config,
        ));

        let prev = index.checked_sub(1).and_then(|i| site.pages.get(i));
        let next = site.pages.get(index + 1);

        let mut template = self.template_data(site, &base);
        template.extend([
            ("pageTitle".to_owned(), escape_html(&data.title)),
            ("content".to_owned(), data.content.clone()),
            ("sidebar".to_owned(), compose::sidebar(site.nav, &page.path, &base)),
            ("breadcrumbs".to_owned(), compose::breadcrumbs(site.nav, &page.path, &base)),
            ("toc".to_owned(), compose::table_of_contents(&data.headings)),
            ("prevNext".to_owned(), compose::prev_next(prev, next, &base)),
            ("extraHead".to_owned(), head.join("\n")),
            ("extraBodyStart".to_owned(), body_start.join("\n")),
            ("extraBodyEnd".to_owned(), body_end.join("\n")),
        ]);
        let template = self.registry.replace(hooks::TEMPLATE, template)?;

        Ok(compose::substitute(&site.theme.template, &template))
    }

    /// Template values that do not depend on the page.
    fn template_data(&self, site: &Site<'_>, base: &str) -> TemplateData {
        let live_reload = if self.options.live_reload {
            LIVE_RELOAD_SCRIPT
        } else {
            ""
        };
        TemplateData::from([
            ("bookTitle".to_owned(), escape_html(&site.config.title)),
            ("basePath".to_owned(), base.to_owned()),
            ("liveReloadScript".to_owned(), live_reload.to_owned()),
            ("versionSwitcher".to_owned(), site.version_switcher.clone()),
            ("localeSwitcher".to_owned(), site.locale_switcher.clone()),
        ])
    }

    /// `index.html`, `404.html` and `_redirects`.
    fn write_extras(&self, site: &Site<'_>, output_dir: &Path) -> Result<(), BuildError> {
        // Refreshed every run so the root follows README edits and the
        // live-reload script.
        let index_is_page = site
            .pages
            .iter()
            .any(|page| compose::html_path(&page.path) == "index.html");
        let readme = output_dir.join("README.html");
        if !index_is_page && readme.is_file() {
            let index = output_dir.join("index.html");
            fs::copy(&readme, &index).map_err(io_error(&index))?;
        }

        let mut template = self.template_data(site, "/");
        template.extend([
            ("pageTitle".to_owned(), "Page not found".to_owned()),
            ("content".to_owned(), NOT_FOUND_CONTENT.to_owned()),
            ("sidebar".to_owned(), compose::sidebar(site.nav, "", "/")),
        ]);
        for key in ["breadcrumbs", "toc", "prevNext", "extraHead", "extraBodyStart", "extraBodyEnd"] {
            template.insert(key.to_owned(), String::new());
        }
        let template = self.registry.replace(hooks::TEMPLATE, template)?;
        write(
            &output_dir.join("404.html"),
            &compose::substitute(&site.theme.template, &template),
        )?;

        write(&output_dir.join("_redirects"), &redirects(&self.config.redirects))
    }
}

/// Rules for the `_redirects` file.
fn redirects<'a>(extra: impl IntoIterator<Item = (&'a String, &'a String)>) -> String {
    let mut rules = String::from("/README.html  /index.html  301\n");
    for (from, to) in extra {
        writeln!(rules, "{from}  {to}  301").unwrap();
    }
    rules.push_str("/*  /404.html  404\n");
    rules
}

/// Minify a page, keeping the original when the result is unusable.
fn minify(html: String, path: &str) -> String {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.minify_css = true;
    cfg.minify_js = true;

    let minified = minify_html::minify(html.as_bytes(), &cfg);
    match String::from_utf8(minified) {
        Ok(minified) if !minified.is_empty() => minified,
        Ok(_) => {
            tracing::debug!(path, "Minifier produced empty output, keeping original");
            html
        }
        Err(e) => {
            tracing::debug!(path, error = %e, "Minifier produced invalid UTF-8, keeping original");
            html
        }
    }
}

fn write(path: &Path, content: &str) -> Result<(), BuildError> {
    fs::write(path, content).map_err(io_error(path))
}
