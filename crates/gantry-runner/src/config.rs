use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use gantry_kernel::ReloadStrategy;

/// Context for modules listed outside any app.
const SYSTEM_CONTEXT: &str = "system";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Key of the app module to launch at boot.
    #[serde(default)]
    pub app: Option<String>,

    /// Modules loaded at boot outside any app (input drivers, debug
    /// overlays and the like).
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,

    #[serde(default)]
    pub reload: ReloadConfig,

    /// Whether to also log to a file.
    #[serde(default)]
    pub log_to_file: bool,
}

impl RuntimeConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub key: String,

    /// Grouping context; boot modules default to a shared system
    /// context.
    #[serde(default)]
    pub context: Option<String>,

    /// Whether to enable the module once loaded (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl ModuleEntry {
    pub fn context(&self) -> &str {
        self.context.as_deref().unwrap_or(SYSTEM_CONTEXT)
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// Whether the reload transport runs at all (default: true).
    #[serde(default = "default_reload_enabled")]
    pub enabled: bool,

    /// What a resource change triggers (default: restart everything).
    #[serde(default)]
    pub strategy: ReloadStrategy,

    /// Directory watched for module resource changes
    /// (default: `<data dir>/modules`).
    #[serde(default)]
    pub watch_dir: Option<PathBuf>,

    /// Scan interval in milliseconds (default: 1000ms).
    #[serde(default = "default_scan_interval")]
    pub scan_interval_ms: u64,

    /// Extension of module resource files (default: `so`).
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_reload_enabled() -> bool {
    true
}

fn default_scan_interval() -> u64 {
    1000
}

fn default_extension() -> String {
    "so".to_string()
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: ReloadStrategy::default(),
            watch_dir: None,
            scan_interval_ms: default_scan_interval(),
            extension: default_extension(),
        }
    }
}

impl ReloadConfig {
    /// Watched directory (configured or default).
    pub fn watch_dir(&self) -> PathBuf {
        self.watch_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "gantry")
                .map(|dirs| dirs.data_dir().join("modules"))
                .unwrap_or_else(|| PathBuf::from(".modules"))
        })
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }
}
