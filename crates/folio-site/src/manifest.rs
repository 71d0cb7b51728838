//! Persisted build state for incremental builds.

use std::collections::BTreeMap;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

/// Manifest file name inside the output directory.
pub const MANIFEST_FILENAME: &str = ".folio-manifest.json";

/// What the previous build recorded for one page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Source modification time, nanoseconds since the Unix epoch.
    pub mtime: u64,
    /// Title the page was built with.
    pub title: String,
}

/// Page path to [`ManifestEntry`] mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the manifest from `output_dir`.
    ///
    /// A missing or unreadable manifest yields an empty one, which forces
    /// every page to rebuild.
    #[must_use]
    pub fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(MANIFEST_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No build manifest, full build");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read build manifest");
                return Self::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt build manifest, full build");
            Self::default()
        })
    }

    /// Write the manifest into `output_dir`.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(output_dir.join(MANIFEST_FILENAME), json)
    }

    /// Entry for `path` if it is still valid for `mtime`.
    #[must_use]
    pub fn fresh(&self, path: &str, mtime: u64) -> Option<&ManifestEntry> {
        self.entries.get(path).filter(|entry| entry.mtime == mtime)
    }

    #[cfg(test)]
    pub fn get(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.get(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, entry: ManifestEntry) {
        self.entries.insert(path.into(), entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Modification time of a file in nanoseconds since the Unix epoch.
///
/// Filesystems without modification times report 0, which never matches a
/// recorded entry from a filesystem that has them.
#[must_use]
pub fn mtime_nanos(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
        })
}
