//! The module hook contract.
//!
//! Modules declare the hooks they implement through [`Capabilities`];
//! the dispatcher consults the declared set before invoking anything,
//! so a default no-op body is never mistaken for an implementation.

use std::collections::BTreeMap;

use bitflags::bitflags;
use serde_json::Value;
use tracing::warn;

bitflags! {
    /// The set of hooks a module implements.
    ///
    /// Derived from the handle on demand, never stored on the record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        const ON_LOAD             = 1 << 0;
        const INIT                = 1 << 1;
        const ON_ENABLE           = 1 << 2;
        const ON_DISABLE          = 1 << 3;
        /// Marker: the module consents to being hot-reloaded. The
        /// dispatcher re-runs `on_load` and `init` on the fresh
        /// instance rather than invoking a dedicated hook.
        const RELOAD              = 1 << 4;
        const ON_UPDATE           = 1 << 5;
        const BEFORE_RENDER_EARLY = 1 << 6;
        const BEFORE_RENDER_LATE  = 1 << 7;
        const ON_RENDER           = 1 << 8;
        const LAUNCH_APP          = 1 << 9;
        const END_APP             = 1 << 10;
        const MODULE_CONFIG       = 1 << 11;
    }
}

/// A named lifecycle point the host can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    OnLoad,
    Init,
    OnEnable,
    OnDisable,
    OnUpdate,
    BeforeRenderEarly,
    BeforeRenderLate,
    OnRender,
    LaunchApp,
    EndApp,
    ModuleConfig,
}

impl Hook {
    /// The capability a module must declare for this hook to fire.
    pub fn required_capability(self) -> Capabilities {
        match self {
            Hook::OnLoad => Capabilities::ON_LOAD,
            Hook::Init => Capabilities::INIT,
            Hook::OnEnable => Capabilities::ON_ENABLE,
            Hook::OnDisable => Capabilities::ON_DISABLE,
            Hook::OnUpdate => Capabilities::ON_UPDATE,
            Hook::BeforeRenderEarly => Capabilities::BEFORE_RENDER_EARLY,
            Hook::BeforeRenderLate => Capabilities::BEFORE_RENDER_LATE,
            Hook::OnRender => Capabilities::ON_RENDER,
            Hook::LaunchApp => Capabilities::LAUNCH_APP,
            Hook::EndApp => Capabilities::END_APP,
            Hook::ModuleConfig => Capabilities::MODULE_CONFIG,
        }
    }
}

/// The result a hook hands back for merging.
///
/// Independent modules return either list-shaped or map-shaped data for
/// the same hook; the broadcaster folds them into one composite value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HookOutput {
    /// The hook produced nothing.
    #[default]
    Empty,
    /// List-shaped results concatenate in invocation order.
    List(Vec<Value>),
    /// Map-shaped results overlay key-by-key; later invocation wins.
    Map(BTreeMap<String, Value>),
}

impl HookOutput {
    pub fn is_empty(&self) -> bool {
        matches!(self, HookOutput::Empty)
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        HookOutput::List(items.into_iter().collect())
    }

    pub fn map(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        HookOutput::Map(entries.into_iter().collect())
    }

    /// Fold another result into this one.
    ///
    /// The first non-empty result fixes the shape. A later result of
    /// the other shape is dropped with a warning; hook contracts are
    /// expected to agree on a shape per hook.
    pub fn merge(self, other: HookOutput) -> HookOutput {
        match (self, other) {
            (HookOutput::Empty, other) => other,
            (acc, HookOutput::Empty) => acc,
            (HookOutput::List(mut acc), HookOutput::List(items)) => {
                acc.extend(items);
                HookOutput::List(acc)
            }
            (HookOutput::Map(mut acc), HookOutput::Map(entries)) => {
                // extend overwrites existing keys, so later wins
                acc.extend(entries);
                HookOutput::Map(acc)
            }
            (acc, mismatched) => {
                warn!(
                    target: "modules",
                    "dropping {} hook result merged into {} accumulator",
                    mismatched.shape_name(),
                    acc.shape_name()
                );
                acc
            }
        }
    }

    fn shape_name(&self) -> &'static str {
        match self {
            HookOutput::Empty => "empty",
            HookOutput::List(_) => "list",
            HookOutput::Map(_) => "map",
        }
    }
}

/// Trait every module implements.
///
/// All hooks are optional: a module overrides the ones it cares about
/// and names them in [`Module::capabilities`]. Hooks not named there
/// are never invoked, even if overridden.
pub trait Module: Send {
    /// Hooks this module implements.
    fn capabilities(&self) -> Capabilities;

    /// Called once when the load resolves. Peer modules may not be in
    /// a usable state yet.
    fn on_load(&mut self) {}

    /// Called from context init, after every peer in the context has
    /// loaded. May run more than once; idempotence is the module's own
    /// responsibility.
    fn init(&mut self) {}

    /// The module was enabled; per-frame hooks will fire after this.
    fn on_enable(&mut self) {}

    /// The module is being disabled; per-frame hooks stop after this.
    fn on_disable(&mut self) {}

    /// Per-frame update while enabled.
    fn on_update(&mut self) -> HookOutput {
        HookOutput::Empty
    }

    /// Early render phase; produces draw data for the scene payload.
    fn before_render_early(&mut self) -> HookOutput {
        HookOutput::Empty
    }

    /// Late render phase; produces draw data for the scene payload.
    fn before_render_late(&mut self) -> HookOutput {
        HookOutput::Empty
    }

    /// Consumes the merged render-phase payload.
    fn on_render(&mut self, _scene: &HookOutput) {}

    /// The application-switcher selected this module's app.
    fn launch_app(&mut self) {}

    /// The application-switcher is tearing this module's app down.
    fn end_app(&mut self) {}

    /// Declarative module list for app modules: a map from module key
    /// to an entry object (`{"enabled": bool}`).
    fn module_config(&mut self) -> HookOutput {
        HookOutput::Empty
    }
}
