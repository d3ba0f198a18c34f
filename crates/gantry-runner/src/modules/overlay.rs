use std::sync::{Arc, Mutex};

use serde_json::json;
use tracing::trace;

use gantry_kernel::{Capabilities, HookOutput, Module};

/// Contributes a frame counter to the scene payload and consumes the
/// merged scene in the render phase, standing in for a real renderer.
#[derive(Default)]
pub struct OverlayModule {
    frames: u64,
    scene_probe: Option<Arc<Mutex<Option<HookOutput>>>>,
}

impl OverlayModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose the last scene this module rendered (used by tests).
    pub fn with_scene_probe(mut self, probe: Arc<Mutex<Option<HookOutput>>>) -> Self {
        self.scene_probe = Some(probe);
        self
    }
}

impl Module for OverlayModule {
    fn capabilities(&self) -> Capabilities {
        Capabilities::INIT
            .union(Capabilities::BEFORE_RENDER_LATE)
            .union(Capabilities::ON_RENDER)
    }

    fn init(&mut self) {
        self.frames = 0;
    }

    fn before_render_late(&mut self) -> HookOutput {
        self.frames += 1;
        HookOutput::map([("overlay.frames".to_string(), json!(self.frames))])
    }

    fn on_render(&mut self, scene: &HookOutput) {
        trace!(target: "modules", "overlay rendering scene: {:?}", scene);
        if let Some(probe) = &self.scene_probe {
            *probe.lock().unwrap() = Some(scene.clone());
        }
    }
}
