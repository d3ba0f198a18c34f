use serde_json::json;
use tracing::info;

use gantry_kernel::{Capabilities, HookOutput, Module};

/// App module for the built-in demo: declares its module list and logs
/// launch/end transitions.
#[derive(Default)]
pub struct DemoApp;

impl DemoApp {
    pub fn new() -> Self {
        Self
    }
}

impl Module for DemoApp {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ON_LOAD
            .union(Capabilities::MODULE_CONFIG)
            .union(Capabilities::LAUNCH_APP)
            .union(Capabilities::END_APP)
    }

    fn on_load(&mut self) {
        info!(target: "launcher", "demo app loaded");
    }

    fn module_config(&mut self) -> HookOutput {
        HookOutput::map([
            ("demo/heartbeat".to_string(), json!({ "enabled": true })),
            ("demo/overlay".to_string(), json!({ "enabled": true })),
        ])
    }

    fn launch_app(&mut self) {
        info!(target: "launcher", "demo app launched");
    }

    fn end_app(&mut self) {
        info!(target: "launcher", "demo app ended");
    }
}
