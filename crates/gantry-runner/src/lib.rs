//! Host shell around the gantry kernel.
//!
//! Provides what an embedding application needs beyond the kernel
//! itself: config loading, logging bootstrap, the per-frame driver,
//! the app launcher and the file-watch reload transport, plus a pair
//! of built-in demo modules.

pub mod config;
pub mod frame;
pub mod launcher;
pub mod logging;
pub mod modules;
pub mod reload;
pub mod watcher;

pub use config::{ModuleEntry, ReloadConfig, RuntimeConfig};
pub use frame::FrameDriver;
pub use reload::{apply_changes, setup_reload_signal, ReloadAction, ReloadSignal};
pub use watcher::{ResourceScanner, ScanResult};
