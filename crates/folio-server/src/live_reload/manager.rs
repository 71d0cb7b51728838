//! Live reload manager.
//!
//! Watches the project, rebuilds the site when it changes and tells
//! connected browsers to reload.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use folio_config::Config;
use folio_site::{BuildOptions, SUMMARY_FILENAME};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use super::debouncer::{EventDebouncer, FsEvent, FsEventKind, is_temp_file};
use crate::error::ServerError;

/// Signal sent to every connected browser after a rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Reload;

/// Interval at which the debouncer is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Locations whose changes trigger a rebuild.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct WatchPaths {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub plugins_dir: PathBuf,
    pub config_file: Option<PathBuf>,
}

impl WatchPaths {
    pub fn from_config(config: &Config) -> Self {
        let docs = &config.docs_resolved;
        Self {
            source_dir: docs.source_dir.clone(),
            output_dir: docs.output_dir.clone(),
            plugins_dir: docs.plugins_dir.clone(),
            config_file: config.config_path.clone(),
        }
    }

    /// Register every location with `watcher`.
    fn watch(&self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        watcher.watch(&self.source_dir, RecursiveMode::Recursive)?;
        if self.plugins_dir.is_dir() {
            watcher.watch(&self.plugins_dir, RecursiveMode::Recursive)?;
        }
        if let Some(config_file) = &self.config_file {
            watcher.watch(config_file, RecursiveMode::NonRecursive)?;
        }
        Ok(())
    }

    /// Stop watching every location. Locations that were never watched are ignored.
    fn unwatch(&self, watcher: &mut RecommendedWatcher) {
        let _ = watcher.unwatch(&self.source_dir);
        let _ = watcher.unwatch(&self.plugins_dir);
        if let Some(config_file) = &self.config_file {
            let _ = watcher.unwatch(config_file);
        }
    }

    /// Whether an event at `path` can affect the site.
    fn is_relevant(&self, path: &Path) -> bool {
        !path.starts_with(&self.output_dir) && !is_temp_file(path)
    }

    /// Whether a change can be picked up by an incremental build.
    ///
    /// Only edits to existing pages qualify. New, removed or renamed files,
    /// the summary, plugins and the config file change every page's chrome
    /// or hooks, so they force a full rebuild.
    fn is_page_edit(&self, event: &FsEvent) -> bool {
        event.kind == FsEventKind::Modified
            && event.path.starts_with(&self.source_dir)
            && event.path.file_name().is_none_or(|name| name != SUMMARY_FILENAME)
    }
}

/// State the rebuild task updates when `folio.toml` changes.
struct Watched {
    paths: Arc<RwLock<WatchPaths>>,
    watcher: Arc<Mutex<RecommendedWatcher>>,
    debouncer: Arc<EventDebouncer>,
}

/// Watches files and drives rebuilds.
///
/// Dropping the manager stops the watcher.
pub(crate) struct LiveReloadManager {
    config: Arc<Config>,
    broadcaster: broadcast::Sender<Reload>,
    watcher: Option<Arc<Mutex<RecommendedWatcher>>>,
}

impl LiveReloadManager {
    pub fn new(config: Arc<Config>, broadcaster: broadcast::Sender<Reload>) -> Self {
        Self {
            config,
            broadcaster,
            watcher: None,
        }
    }

    /// Start watching.
    ///
    /// Spawns one task feeding the debouncer and one task running rebuilds.
    /// The rebuild task awaits each build before polling again, so builds
    /// never overlap; events arriving during a build wait in the debouncer
    /// and trigger the next one.
    pub fn start(&mut self) -> Result<(), ServerError> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

        let paths = WatchPaths::from_config(&self.config);
        paths.watch(&mut watcher)?;
        let watcher = Arc::new(Mutex::new(watcher));
        self.watcher = Some(Arc::clone(&watcher));

        let watched = Watched {
            paths: Arc::new(RwLock::new(paths)),
            watcher,
            debouncer: Arc::new(EventDebouncer::new(Duration::from_millis(
                self.config.server.debounce_ms,
            ))),
        };
        let debouncer_for_record = Arc::clone(&watched.debouncer);
        let paths_for_record = Arc::clone(&watched.paths);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                Self::record_event(&event, &paths_for_record.read().unwrap(), &debouncer_for_record);
            }
        });

        let mut config = Arc::clone(&self.config);
        let broadcaster = self.broadcaster.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            loop {
                interval.tick().await;

                let events = watched.debouncer.take_ready();
                if events.is_empty() {
                    continue;
                }
                Self::handle_events(&events, &watched, &mut config, &broadcaster).await;
            }
        });

        Ok(())
    }

    /// Record a raw filesystem event into the debouncer.
    fn record_event(event: &Event, paths: &WatchPaths, debouncer: &EventDebouncer) {
        for path in &event.paths {
            let Some(kind) = event_kind(&event.kind, path) else {
                continue;
            };
            if !paths.is_relevant(path) {
                continue;
            }
            debouncer.record(path.clone(), kind);
            tracing::debug!(path = %path.display(), ?kind, "Recorded filesystem event");
        }
    }

    /// Rebuild after a debounced batch of events and notify clients.
    async fn handle_events(
        events: &[FsEvent],
        watched: &Watched,
        config: &mut Arc<Config>,
        broadcaster: &broadcast::Sender<Reload>,
    ) {
        let start = Instant::now();

        let force = {
            let paths = watched.paths.read().unwrap();
            !events.iter().all(|e| paths.is_page_edit(e))
        };
        Self::reload_config(events, watched, config);

        let options = BuildOptions {
            force,
            clean: false,
            live_reload: true,
        };

        match crate::build(Arc::clone(config), options).await {
            Ok(report) => {
                let _ = broadcaster.send(Reload);
                tracing::info!(
                    changes = events.len(),
                    built = report.built,
                    skipped = report.skipped,
                    elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Rebuilt after changes"
                );
            }
            Err(e) => tracing::error!(error = %e, "Rebuild failed"),
        }
    }

    /// Reload `folio.toml` if it is among `events`, then move the watches
    /// and the quiet period over to the new settings.
    fn reload_config(events: &[FsEvent], watched: &Watched, config: &mut Arc<Config>) {
        let Some(config_file) = watched.paths.read().unwrap().config_file.clone() else {
            return;
        };
        if !events.iter().any(|e| e.path == config_file) {
            return;
        }

        let reloaded = match Config::load(Some(&config_file), None) {
            Ok(reloaded) => reloaded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload configuration, keeping previous");
                return;
            }
        };
        tracing::info!(path = %config_file.display(), "Configuration reloaded");

        watched
            .debouncer
            .set_quiet_period(Duration::from_millis(reloaded.server.debounce_ms));

        let new_paths = WatchPaths::from_config(&reloaded);
        let mut paths = watched.paths.write().unwrap();
        if *paths != new_paths {
            let mut watcher = watched.watcher.lock().unwrap();
            paths.unwatch(&mut watcher);
            if let Err(e) = new_paths.watch(&mut watcher) {
                tracing::error!(error = %e, "Failed to watch new locations");
            }
            tracing::info!(source = %new_paths.source_dir.display(), "Watching updated locations");
            *paths = new_paths;
        }
        drop(paths);

        *config = Arc::new(reloaded);
    }
}

/// Map a raw notify event kind to a debouncer kind for `path`.
///
/// Renames are reported per path, so the old name reads as removed and the
/// new name as created. Metadata-only changes are ignored.
fn event_kind(kind: &EventKind, path: &Path) -> Option<FsEventKind> {
    match kind {
        EventKind::Create(_) => Some(FsEventKind::Created),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(ModifyKind::Name(_)) if path.exists() => Some(FsEventKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) | EventKind::Remove(_) => Some(FsEventKind::Removed),
        EventKind::Modify(_) => Some(FsEventKind::Modified),
        _ => None,
    }
}
