//! Module lifecycle kernel for component-based runtimes.
//!
//! Modules are registered under string keys, loaded asynchronously,
//! grouped by an opaque context identifier, and driven through load /
//! init / enable / disable / reload transitions by a single-owner
//! [`ModuleHost`]. Feature modules plug in through the optional hook
//! contract in [`module`]; this crate never drives the frame loop
//! itself, it only gates which modules a frame driver may call.

pub mod broadcast;
pub mod context;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod loader;
pub mod module;
pub mod registry;
pub mod reload;

pub use error::{HostError, LoadError};
pub use host::ModuleHost;
pub use loader::{FactorySource, ModuleSource};
pub use module::{Capabilities, Hook, HookOutput, Module};
pub use registry::{ModuleRecord, ModuleRegistry, ModuleState, ModuleStatus};
pub use reload::{KeyResolver, PathKeyResolver, ReloadBridge, ReloadOutcome, ReloadStrategy};

// Listener types live in gantry-events so tooling can subscribe
// without depending on the kernel; re-exported for convenience.
pub use gantry_events::{ChangeListener, ChangeNotice, Operation};
