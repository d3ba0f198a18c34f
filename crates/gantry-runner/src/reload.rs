//! The reload transport: turns detected resource changes into kernel
//! reloads (or a full restart, depending on the configured strategy).

use std::path::PathBuf;

use tokio::sync::watch;
use tracing::info;

use gantry_kernel::{ModuleHost, ReloadBridge, ReloadOutcome, ReloadStrategy};

/// What the transport decided for one batch of changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadAction {
    /// Restart the whole runtime; the bridge was bypassed. The
    /// embedder typically ends and relaunches the active app.
    Restart,
    /// One path went through the bridge.
    Bridged(ReloadOutcome),
}

/// Apply a batch of changed resource paths under the given strategy.
pub fn apply_changes(
    host: &mut ModuleHost,
    bridge: &ReloadBridge,
    strategy: ReloadStrategy,
    changed: &[PathBuf],
) -> Vec<ReloadAction> {
    if changed.is_empty() {
        return Vec::new();
    }
    match strategy {
        ReloadStrategy::RestartAll => {
            info!(target: "reload", "{} resource(s) changed, requesting restart", changed.len());
            vec![ReloadAction::Restart]
        }
        ReloadStrategy::ReloadModule => changed
            .iter()
            .map(|path| ReloadAction::Bridged(bridge.apply(host, path)))
            .collect(),
    }
}

/// Reload signal type (empty - just signals that a reload is requested).
#[derive(Debug, Clone)]
pub struct ReloadSignal;

/// Create a reload signal channel and spawn a SIGUSR2 handler.
///
/// Returns a receiver that is notified when SIGUSR2 arrives; the
/// embedder treats it as a forced restart regardless of strategy.
#[cfg(unix)]
pub fn setup_reload_signal() -> watch::Receiver<Option<ReloadSignal>> {
    let (reload_tx, reload_rx) = watch::channel(None);

    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigusr2 = match signal(SignalKind::user_defined2()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(target: "reload", "Failed to register SIGUSR2 handler: {}", e);
                return;
            }
        };

        loop {
            if reload_tx.is_closed() {
                info!(target: "reload", "Reload signal receiver dropped, shutting down SIGUSR2 handler");
                break;
            }

            sigusr2.recv().await;
            info!(target: "reload", "Received SIGUSR2 - triggering restart");

            if reload_tx.send(Some(ReloadSignal)).is_err() {
                break;
            }

            // Clear the signal after a moment to allow detection.
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            let _ = reload_tx.send(None);
        }
    });

    reload_rx
}

/// Create a reload signal channel (non-Unix platforms don't support SIGUSR2).
#[cfg(not(unix))]
pub fn setup_reload_signal() -> watch::Receiver<Option<ReloadSignal>> {
    let (reload_tx, reload_rx) = watch::channel(None);
    tracing::warn!(target: "reload", "SIGUSR2 reload not supported on this platform");
    // Keep the sender alive but never send signals.
    std::mem::forget(reload_tx);
    reload_rx
}
