//! Bridge from external resource-change events to module reloads.
//!
//! The transport that watches for changes only knows resource paths;
//! this bridge resolves a path to a module key through a caller-
//! supplied rule and drives the dispatcher's reload transition.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::ModuleHost;

/// How the transport reacts to a changed resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadStrategy {
    /// Restart the whole runtime; the bridge is bypassed entirely.
    #[default]
    RestartAll,
    /// Resolve the changed path to one module and reload it in place.
    ReloadModule,
}

/// Maps a changed resource path to the module key it implements.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, path: &Path) -> Option<String>;
}

/// Resolver for the conventional layout `<root>/<key>.<ext>`, where
/// the key may span subdirectories (`apps/pong/balls`).
pub struct PathKeyResolver {
    root: PathBuf,
    extension: String,
}

impl PathKeyResolver {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }
}

impl KeyResolver for PathKeyResolver {
    fn resolve(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        if relative.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
            return None;
        }
        let stem = relative.with_extension("");
        let mut key = String::new();
        for component in stem.components() {
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(component.as_os_str().to_str()?);
        }
        (!key.is_empty()).then_some(key)
    }
}

/// What the bridge did with one changed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A fresh load is in flight for the named module.
    Reloading(String),
    /// The path resolved to a module that does not consent to reload
    /// (or has no record); nothing was done.
    Skipped(String),
    /// The path does not name any module.
    Unresolved,
}

/// Drives module reloads from resource-change events.
pub struct ReloadBridge {
    resolver: Box<dyn KeyResolver>,
}

impl ReloadBridge {
    pub fn new(resolver: impl KeyResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
        }
    }

    /// Resolve `path` and reload the module it names.
    pub fn apply(&self, host: &mut ModuleHost, path: &Path) -> ReloadOutcome {
        let Some(key) = self.resolver.resolve(path) else {
            debug!(target: "reload", "no module for changed path {}", path.display());
            return ReloadOutcome::Unresolved;
        };
        if !host.can_reload(&key) {
            debug!(target: "reload", "change to {} ignored, not reload-capable", key);
            return ReloadOutcome::Skipped(key);
        }
        host.reload(&key);
        ReloadOutcome::Reloading(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_strips_root_and_extension() {
        let resolver = PathKeyResolver::new("/srv/app/modules", "so");
        assert_eq!(
            resolver.resolve(Path::new("/srv/app/modules/apps/pong/balls.so")),
            Some("apps/pong/balls".to_string())
        );
    }

    #[test]
    fn test_resolver_rejects_foreign_paths() {
        let resolver = PathKeyResolver::new("/srv/app/modules", "so");
        assert_eq!(resolver.resolve(Path::new("/etc/passwd")), None);
        assert_eq!(
            resolver.resolve(Path::new("/srv/app/modules/notes.txt")),
            None
        );
    }
}
