//! Hook dispatch across many modules with result merging.
//!
//! A broadcast invokes one hook on every enabled module that declares
//! it and folds the returned [`HookOutput`]s into one composite value.
//! A panicking module is logged and skipped so one bad collaborator
//! cannot take the frame down; lifecycle transitions deliberately do
//! not get this shield.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use crate::error::HostError;
use crate::host::ModuleHost;
use crate::module::{Hook, HookOutput, Module};

/// Route a hook to its trait method. Total over `Hook`; hooks without
/// a return value yield `Empty`.
fn run_producer(module: &mut dyn Module, hook: Hook) -> HookOutput {
    match hook {
        Hook::OnLoad => {
            module.on_load();
            HookOutput::Empty
        }
        Hook::Init => {
            module.init();
            HookOutput::Empty
        }
        Hook::OnEnable => {
            module.on_enable();
            HookOutput::Empty
        }
        Hook::OnDisable => {
            module.on_disable();
            HookOutput::Empty
        }
        Hook::OnUpdate => module.on_update(),
        Hook::BeforeRenderEarly => module.before_render_early(),
        Hook::BeforeRenderLate => module.before_render_late(),
        Hook::OnRender => {
            module.on_render(&HookOutput::Empty);
            HookOutput::Empty
        }
        Hook::LaunchApp => {
            module.launch_app();
            HookOutput::Empty
        }
        Hook::EndApp => {
            module.end_app();
            HookOutput::Empty
        }
        Hook::ModuleConfig => module.module_config(),
    }
}

/// Route a hook with an input payload. Hooks without an input side
/// ignore the payload and dispatch as a producer.
fn run_consumer(module: &mut dyn Module, hook: Hook, payload: &HookOutput) {
    match hook {
        Hook::OnRender => module.on_render(payload),
        other => {
            run_producer(module, other);
        }
    }
}

impl ModuleHost {
    /// Invoke one hook on one module. No-op (`Empty`) when the key is
    /// unknown, the handle is absent, or the capability is undeclared.
    pub fn invoke(&mut self, key: &str, hook: Hook) -> HookOutput {
        let Some(record) = self.registry.get_mut(key) else {
            return HookOutput::Empty;
        };
        let Some(module) = record.handle.as_deref_mut() else {
            return HookOutput::Empty;
        };
        if !module.capabilities().contains(hook.required_capability()) {
            return HookOutput::Empty;
        }
        run_producer(module, hook)
    }

    /// Invoke `hook` on every enabled module that declares it, in
    /// registry iteration order, and merge the results.
    pub fn broadcast(&mut self, hook: Hook) -> HookOutput {
        let needed = hook.required_capability();
        let mut merged = HookOutput::Empty;
        for record in self.registry.iter_mut() {
            if !record.enabled {
                continue;
            }
            let key = record.key.clone();
            let Some(module) = record.handle.as_deref_mut() else {
                continue;
            };
            if !module.capabilities().contains(needed) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| run_producer(module, hook))) {
                Ok(output) => merged = merged.merge(output),
                Err(_) => {
                    error!(target: "modules", "module {} panicked during {:?}", key, hook);
                }
            }
        }
        merged
    }

    /// Invoke `hook` on every loaded module that declares it,
    /// regardless of enabled state. Results are discarded.
    pub fn broadcast_all(&mut self, hook: Hook) {
        let needed = hook.required_capability();
        for record in self.registry.iter_mut() {
            let key = record.key.clone();
            let Some(module) = record.handle.as_deref_mut() else {
                continue;
            };
            if !module.capabilities().contains(needed) {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| run_producer(module, hook))).is_err() {
                error!(target: "modules", "module {} panicked during {:?}", key, hook);
            }
        }
    }

    /// Feed a payload to every enabled module declaring `hook`.
    pub fn broadcast_input(&mut self, hook: Hook, payload: &HookOutput) {
        let needed = hook.required_capability();
        for record in self.registry.iter_mut() {
            if !record.enabled {
                continue;
            }
            let key = record.key.clone();
            let Some(module) = record.handle.as_deref_mut() else {
                continue;
            };
            if !module.capabilities().contains(needed) {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| run_consumer(module, hook, payload))).is_err() {
                error!(target: "modules", "module {} panicked during {:?}", key, hook);
            }
        }
    }

    /// Merge `producer` across enabled modules, then feed the payload
    /// to every enabled module declaring `consumer`.
    pub fn broadcast_with_input(&mut self, producer: Hook, consumer: Hook) {
        let payload = self.broadcast(producer);
        self.broadcast_input(consumer, &payload);
    }

    /// Like [`broadcast`](Self::broadcast), scoped to the context of
    /// the record registered under `key`.
    pub fn broadcast_to_peers(&mut self, key: &str, hook: Hook) -> Result<HookOutput, HostError> {
        let context = self
            .registry
            .get(key)
            .ok_or_else(|| HostError::UnknownModule(key.to_string()))?
            .context()
            .to_string();
        let needed = hook.required_capability();
        let mut merged = HookOutput::Empty;
        for record in self.registry.iter_mut() {
            if record.context != context || !record.enabled {
                continue;
            }
            let member = record.key.clone();
            let Some(module) = record.handle.as_deref_mut() else {
                continue;
            };
            if !module.capabilities().contains(needed) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| run_producer(module, hook))) {
                Ok(output) => merged = merged.merge(output),
                Err(_) => {
                    error!(target: "modules", "module {} panicked during {:?}", member, hook);
                }
            }
        }
        Ok(merged)
    }
}
