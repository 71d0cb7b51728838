//! Event debouncing for rebuilds.
//!
//! Every recorded event pushes the deadline back, so a burst of saves ends in
//! a single rebuild once the filesystem has been quiet for the debounce
//! duration. Events for the same path are coalesced along the way.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Kind of filesystem event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FsEventKind {
    Created,
    Modified,
    Removed,
}

/// A debounced filesystem event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FsEvent {
    pub path: PathBuf,
    pub kind: FsEventKind,
}

struct Pending {
    events: HashMap<PathBuf, FsEventKind>,
    deadline: Option<Instant>,
    quiet_period: Duration,
}

/// Thread-safe restart-on-event debouncer.
pub(crate) struct EventDebouncer {
    pending: Mutex<Pending>,
}

impl EventDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            pending: Mutex::new(Pending {
                events: HashMap::new(),
                deadline: None,
                quiet_period,
            }),
        }
    }

    /// Change the quiet period for events recorded from now on.
    pub fn set_quiet_period(&self, quiet_period: Duration) {
        self.pending.lock().unwrap().quiet_period = quiet_period;
    }

    /// Record an event now.
    pub fn record(&self, path: PathBuf, kind: FsEventKind) {
        self.record_at(path, kind, Instant::now());
    }

    /// Record an event observed at `now` and restart the timer.
    pub fn record_at(&self, path: PathBuf, kind: FsEventKind, now: Instant) {
        use std::collections::hash_map::Entry;

        let mut pending = self.pending.lock().unwrap();
        pending.deadline = Some(now + pending.quiet_period);

        match pending.events.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(kind);
            }
            Entry::Occupied(mut entry) => match Self::coalesce(*entry.get(), kind) {
                Some(kind) => {
                    entry.insert(kind);
                }
                None => {
                    entry.remove();
                }
            },
        }
    }

    /// Coalesce two event kinds for one path.
    ///
    /// Returns `None` when the path appeared and vanished within the window.
    #[allow(clippy::match_same_arms)]
    fn coalesce(existing: FsEventKind, new: FsEventKind) -> Option<FsEventKind> {
        use FsEventKind::{Created, Modified, Removed};

        match (existing, new) {
            (Created, Created | Modified) => Some(Created),
            (Created, Removed) => None,

            (Modified, Created) => Some(Created),
            (Modified, Modified) => Some(Modified),
            (Modified, Removed) => Some(Removed),

            // Replaced in place
            (Removed, Created | Modified) => Some(Modified),
            (Removed, Removed) => Some(Removed),
        }
    }

    /// Take all pending events if the quiet period has elapsed.
    pub fn take_ready(&self) -> Vec<FsEvent> {
        self.take_ready_at(Instant::now())
    }

    /// Take all pending events if the deadline is at or before `now`.
    ///
    /// Returns an empty list while the timer is still running. Events that
    /// cancelled each other out also yield an empty list.
    pub fn take_ready_at(&self, now: Instant) -> Vec<FsEvent> {
        let mut pending = self.pending.lock().unwrap();
        match pending.deadline {
            Some(deadline) if deadline <= now => {
                pending.deadline = None;
                let mut events: Vec<FsEvent> = pending
                    .events
                    .drain()
                    .map(|(path, kind)| FsEvent { path, kind })
                    .collect();
                events.sort_by(|a, b| a.path.cmp(&b.path));
                events
            }
            _ => Vec::new(),
        }
    }

    /// Current deadline, if events are pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.lock().unwrap().deadline
    }
}

/// Editor swap and backup files that never affect the site.
pub(crate) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "swp" | "swo" | "tmp" | "bak")
        || name.ends_with('~')
        || name.starts_with(".#")
}
