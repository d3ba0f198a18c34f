//! Bulk operations over every module sharing a context key.
//!
//! Context-wide operations are best effort per member: a member whose
//! guard predicate refuses the transition is skipped silently, never
//! aborting the sweep.

use crate::host::ModuleHost;
use crate::module::Hook;

impl ModuleHost {
    /// Run `init` on every record in the context, in registry
    /// iteration order, regardless of enabled state.
    pub fn init_context(&mut self, context: &str) {
        for key in self.registry.context_keys(context) {
            self.invoke(&key, Hook::Init);
        }
    }

    /// Enable every record in the context that `can_enable` permits.
    pub fn enable_context(&mut self, context: &str) {
        for key in self.registry.context_keys(context) {
            self.enable(&key);
        }
    }

    /// Disable every record in the context that `can_disable` permits.
    pub fn disable_context(&mut self, context: &str) {
        for key in self.registry.context_keys(context) {
            self.disable(&key);
        }
    }
}
