//! The single-owner orchestrator instance.
//!
//! All registry mutation and hook invocation happen behind `&mut self`
//! on one [`ModuleHost`], so no two hooks ever run concurrently with
//! each other or with registry state changes. Load resolution happens
//! on spawned tasks, but completions are only applied by the owner
//! (see the loader module).

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use gantry_events::{ChangeListener, ChangeNotice, Operation};

use crate::loader::{LoadCompletion, ModuleSource};
use crate::registry::{ModuleRegistry, ModuleStatus};

/// Orchestrates module loading and lifecycle for one runtime.
///
/// Multiple independent hosts can coexist; nothing here is ambient or
/// static.
pub struct ModuleHost {
    pub(crate) registry: ModuleRegistry,
    pub(crate) source: Arc<dyn ModuleSource>,
    pub(crate) completions_tx: UnboundedSender<LoadCompletion>,
    pub(crate) completions_rx: UnboundedReceiver<LoadCompletion>,
    pub(crate) barrier: Option<Box<dyn FnOnce() + Send>>,
    pub(crate) listeners: Vec<Box<dyn ChangeListener>>,
}

impl ModuleHost {
    /// Create a host that resolves module implementations from `source`.
    pub fn new(source: impl ModuleSource + 'static) -> Self {
        Self::with_source(Arc::new(source))
    }

    pub fn with_source(source: Arc<dyn ModuleSource>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            registry: ModuleRegistry::new(),
            source,
            completions_tx,
            completions_rx,
            barrier: None,
            listeners: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Register a lifecycle listener. Listeners run synchronously, in
    /// registration order, after each transition has been applied.
    pub fn add_listener(&mut self, listener: impl ChangeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Snapshot of every record for status/debug tooling.
    pub fn statuses(&self) -> Vec<ModuleStatus> {
        self.registry.statuses()
    }

    pub(crate) fn notify(&mut self, operation: Operation, key: &str) {
        if self.listeners.is_empty() {
            return;
        }
        let notice = ChangeNotice::new(operation, key);
        for listener in &mut self.listeners {
            listener.on_change(&notice);
        }
    }
}
