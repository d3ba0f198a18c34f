//! Module resource change detection for hot reloading.
//!
//! Polls the watched directory on an interval and diffs modification
//! times against the previous snapshot. The transport hands changed
//! paths to the reload bridge; added and removed resources are
//! reported but it is the embedder's call what to do with them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, warn};

/// Default scan interval (1000ms = 1Hz).
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_millis(1000);

/// Result of one scan of the watched directory.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Resources whose modification time moved.
    pub changed: Vec<PathBuf>,
    /// Resources that appeared since the last scan.
    pub added: Vec<PathBuf>,
    /// Resources that disappeared since the last scan.
    pub removed: Vec<PathBuf>,
}

impl ScanResult {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty() || !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Polling scanner over one directory tree of module resources.
pub struct ResourceScanner {
    dir: PathBuf,
    extension: String,
    scan_interval: Duration,
    last_scan: Option<Instant>,
    snapshot: HashMap<PathBuf, SystemTime>,
}

impl ResourceScanner {
    pub fn new(dir: PathBuf, extension: impl Into<String>) -> Self {
        Self::with_interval(dir, extension, DEFAULT_SCAN_INTERVAL)
    }

    pub fn with_interval(
        dir: PathBuf,
        extension: impl Into<String>,
        scan_interval: Duration,
    ) -> Self {
        let extension = extension.into();
        // Seed the snapshot so pre-existing resources are not reported
        // as freshly added on the first scan.
        let snapshot = Self::snapshot_dir(&dir, &extension);
        Self {
            dir,
            extension,
            scan_interval,
            last_scan: None,
            snapshot,
        }
    }

    /// True once the scan interval has elapsed since the last scan.
    pub fn should_scan(&self) -> bool {
        match self.last_scan {
            Some(last) => last.elapsed() >= self.scan_interval,
            None => true,
        }
    }

    /// Diff the directory against the previous snapshot.
    pub fn scan(&mut self) -> ScanResult {
        self.last_scan = Some(Instant::now());
        let current = Self::snapshot_dir(&self.dir, &self.extension);

        let mut result = ScanResult::default();
        for (path, modified) in &current {
            match self.snapshot.get(path) {
                Some(previous) if previous != modified => {
                    debug!(target: "reload", "resource changed: {}", path.display());
                    result.changed.push(path.clone());
                }
                Some(_) => {}
                None => {
                    debug!(target: "reload", "resource added: {}", path.display());
                    result.added.push(path.clone());
                }
            }
        }
        for path in self.snapshot.keys() {
            if !current.contains_key(path) {
                debug!(target: "reload", "resource removed: {}", path.display());
                result.removed.push(path.clone());
            }
        }

        self.snapshot = current;
        result
    }

    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    /// Walk the directory tree collecting matching resources and their
    /// modification times. A missing directory is an empty snapshot.
    fn snapshot_dir(dir: &PathBuf, extension: &str) -> HashMap<PathBuf, SystemTime> {
        let mut resources = HashMap::new();
        if dir.exists() {
            Self::collect(dir, extension, &mut resources);
        }
        resources
    }

    fn collect(dir: &PathBuf, extension: &str, into: &mut HashMap<PathBuf, SystemTime>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(target: "reload", "failed to read {}: {}", dir.display(), e);
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                // Module keys may span subdirectories (apps/pong/balls).
                Self::collect(&path, extension, into);
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            match std::fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(modified) => {
                    into.insert(path, modified);
                }
                Err(e) => {
                    warn!(target: "reload", "no modification time for {}: {}", path.display(), e);
                }
            }
        }
    }
}
