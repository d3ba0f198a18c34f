//! Single-module lifecycle transitions.
//!
//! Per module the state machine is `Unloaded -> Pending -> Loaded ->
//! {Enabled <-> Disabled}`, with reload sending any loaded state back
//! to `Pending`. Invalid transitions are silent no-ops; callers that
//! care should check the `can_*` predicate first, but calling the
//! transition directly is always safe.

use tracing::debug;

use gantry_events::Operation;

use crate::host::ModuleHost;
use crate::loader::ReloadResume;
use crate::module::{Capabilities, Hook};

impl ModuleHost {
    /// True iff the record exists and is not already enabled.
    ///
    /// Being pending does not block permission: enabling before the
    /// load resolves flips the state bit without a hook (the handle is
    /// checked again before every hook call).
    pub fn can_enable(&self, key: &str) -> bool {
        self.registry.get(key).is_some_and(|r| !r.enabled)
    }

    /// Enable the module: set the flag, run `on_enable` if declared,
    /// then notify. No-op when `can_enable` is false.
    pub fn enable(&mut self, key: &str) {
        if !self.can_enable(key) {
            return;
        }
        if let Some(record) = self.registry.get_mut(key) {
            record.enabled = true;
            if let Some(module) = record.handle.as_deref_mut() {
                if module.capabilities().contains(Capabilities::ON_ENABLE) {
                    module.on_enable();
                }
            }
        }
        debug!(target: "modules", "enabled {}", key);
        self.notify(Operation::Enable, key);
    }

    /// A module may be disabled only while enabled, with a handle, and
    /// only if its enable and disable capabilities agree: a module
    /// enabled through a hook with no matching teardown stays enabled
    /// for good.
    pub fn can_disable(&self, key: &str) -> bool {
        let Some(record) = self.registry.get(key) else {
            return false;
        };
        if !record.enabled || !record.has_handle() {
            return false;
        }
        let caps = record.capabilities();
        caps.contains(Capabilities::ON_ENABLE) == caps.contains(Capabilities::ON_DISABLE)
    }

    /// Disable the module: clear the flag, run `on_disable` if
    /// declared, then notify. No-op when `can_disable` is false.
    pub fn disable(&mut self, key: &str) {
        if !self.can_disable(key) {
            return;
        }
        if let Some(record) = self.registry.get_mut(key) {
            record.enabled = false;
            if let Some(module) = record.handle.as_deref_mut() {
                if module.capabilities().contains(Capabilities::ON_DISABLE) {
                    module.on_disable();
                }
            }
        }
        debug!(target: "modules", "disabled {}", key);
        self.notify(Operation::Disable, key);
    }

    /// Run the module's `init` hook if declared. May be called any
    /// number of times; idempotence is the module's own concern.
    pub fn init(&mut self, key: &str) {
        self.invoke(key, Hook::Init);
    }

    /// True iff a handle is present and declares the reload marker.
    pub fn can_reload(&self, key: &str) -> bool {
        self.registry
            .get(key)
            .is_some_and(|r| r.capabilities().contains(Capabilities::RELOAD))
    }

    /// Hot-swap the module's implementation.
    ///
    /// Remembers the enabled flag, runs a full disable if needed,
    /// discards the handle and requests a fresh load under the same
    /// key; once that resolves, `on_load` and `init` run on the new
    /// instance and the enablement is restored.
    ///
    /// Peers that went through the host to reach this module observe
    /// the fresh handle on their next lookup. A peer that copied data
    /// out of the old instance keeps its stale copy; the host does not
    /// rewire such references.
    pub fn reload(&mut self, key: &str) {
        if !self.can_reload(key) {
            debug!(target: "modules", "reload skipped, {} is not reload-capable", key);
            return;
        }
        debug!(target: "modules", "reloading {}", key);
        let was_enabled = self.registry.get(key).is_some_and(|r| r.enabled);
        if was_enabled {
            self.disable(key);
        }
        if let Some(record) = self.registry.get_mut(key) {
            // Drop the old instance now; the record re-enters the
            // pending state as if freshly loaded.
            record.handle = None;
            record.pending = true;
        }
        self.notify(Operation::Load, key);
        self.spawn_load(key.to_string(), Some(ReloadResume {
            reenable: was_enabled,
        }));
    }
}
