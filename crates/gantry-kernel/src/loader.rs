//! Asynchronous module loading.
//!
//! A load request registers the record immediately and resolves the
//! implementation on a spawned task; the completion travels back over
//! a channel and is applied by the host's owner, atomically with
//! respect to registry state. The caller is never suspended by a
//! request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use gantry_events::Operation;

use crate::error::{HostError, LoadError};
use crate::host::ModuleHost;
use crate::module::{Hook, Module};

/// Resolves module implementations for the host.
///
/// The host environment decides what a key means (a factory table, a
/// dynamic library on disk). Resolution may take arbitrarily long; the
/// host applies whatever arrives, whenever it arrives.
#[async_trait]
pub trait ModuleSource: Send + Sync + 'static {
    async fn load(&self, key: &str) -> Result<Box<dyn Module>, LoadError>;
}

type ModuleFactory = Box<dyn Fn() -> Box<dyn Module> + Send + Sync>;

/// In-process source backed by a table of constructors.
#[derive(Default)]
pub struct FactorySource {
    factories: HashMap<String, ModuleFactory>,
}

impl FactorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, key: &str, factory: F)
    where
        F: Fn() -> Box<dyn Module> + Send + Sync + 'static,
    {
        self.factories.insert(key.to_string(), Box::new(factory));
    }

    pub fn with<F>(mut self, key: &str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Module> + Send + Sync + 'static,
    {
        self.register(key, factory);
        self
    }
}

#[async_trait]
impl ModuleSource for FactorySource {
    async fn load(&self, key: &str) -> Result<Box<dyn Module>, LoadError> {
        self.factories
            .get(key)
            .map(|factory| factory())
            .ok_or_else(|| LoadError::UnknownKey(key.to_string()))
    }
}

/// Result of one resolution, delivered back to the host.
pub(crate) struct LoadCompletion {
    pub(crate) key: String,
    pub(crate) outcome: Result<Box<dyn Module>, LoadError>,
    pub(crate) resume: Option<ReloadResume>,
}

/// What to re-run once a reload's fresh load lands.
pub(crate) struct ReloadResume {
    pub(crate) reenable: bool,
}

impl ModuleHost {
    /// Register `key` under `context` and start resolving its
    /// implementation. Emits a `load` notice at request time.
    ///
    /// Must be called from within a tokio runtime; the resolution runs
    /// on a spawned task.
    pub fn request_load(&mut self, key: &str, context: &str) {
        debug!(target: "modules", "load requested: {} (context {})", key, context);
        self.registry.register(key, context);
        self.notify(Operation::Load, key);
        self.spawn_load(key.to_string(), None);
    }

    /// `request_load` plus an all-loaded barrier in one call.
    pub fn request_load_with_barrier(
        &mut self,
        key: &str,
        context: &str,
        done: impl FnOnce() + Send + 'static,
    ) -> Result<(), HostError> {
        self.request_load(key, context);
        self.when_all_loaded(done)
    }

    pub(crate) fn spawn_load(&self, key: String, resume: Option<ReloadResume>) {
        let source = Arc::clone(&self.source);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = source.load(&key).await;
            // The host owns the receiver; a send failure means it was
            // dropped mid-flight and the completion no longer matters.
            let _ = tx.send(LoadCompletion { key, outcome, resume });
        });
    }

    /// Register a one-shot callback to run once no record is pending.
    ///
    /// At most one barrier may be outstanding; a second registration
    /// fails. If nothing is pending, the callback runs synchronously
    /// within this call.
    pub fn when_all_loaded(
        &mut self,
        done: impl FnOnce() + Send + 'static,
    ) -> Result<(), HostError> {
        if self.barrier.is_some() {
            return Err(HostError::BarrierOccupied);
        }
        self.barrier = Some(Box::new(done));
        self.fire_barrier_if_ready();
        Ok(())
    }

    /// Apply every completion that has already arrived, without
    /// waiting. Returns how many were applied.
    pub fn process_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply_completion(completion);
            applied += 1;
        }
        applied
    }

    /// Await and apply completions until no record is pending.
    pub async fn run_until_loaded(&mut self) {
        while self.registry.pending_count() > 0 {
            match self.completions_rx.recv().await {
                Some(completion) => self.apply_completion(completion),
                // Unreachable while the host holds its own sender.
                None => break,
            }
        }
    }

    fn apply_completion(&mut self, completion: LoadCompletion) {
        let LoadCompletion {
            key,
            outcome,
            resume,
        } = completion;
        match outcome {
            Ok(handle) => {
                let known = match self.registry.get_mut(&key) {
                    Some(record) => {
                        record.handle = Some(handle);
                        record.pending = false;
                        true
                    }
                    None => {
                        warn!(target: "modules", "load resolved for unregistered module {}", key);
                        false
                    }
                };
                if known {
                    debug!(target: "modules", "loaded {}", key);
                    self.invoke(&key, Hook::OnLoad);
                    if let Some(resume) = resume {
                        self.invoke(&key, Hook::Init);
                        if resume.reenable {
                            self.enable(&key);
                        }
                    }
                }
            }
            Err(err) => {
                // The record stays registered with no handle so status
                // tooling reports it as failed; the barrier still gets
                // its chance so one bad module cannot wedge a context
                // start.
                error!(target: "modules", "load failed for {}: {}", key, err);
                if let Some(record) = self.registry.get_mut(&key) {
                    record.pending = false;
                }
            }
        }
        self.fire_barrier_if_ready();
    }

    fn fire_barrier_if_ready(&mut self) {
        if self.registry.pending_count() == 0 {
            if let Some(done) = self.barrier.take() {
                done();
            }
        }
    }
}
