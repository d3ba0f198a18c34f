use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use gantry_kernel::{Capabilities, HookOutput, Module};

/// How many updates between heartbeat log lines (~once a second at
/// the default frame rate).
const BEATS_PER_LOG: u64 = 60;

/// Counts frames while enabled and logs a periodic heartbeat.
///
/// Consents to hot reload; a reload starts the count over, which makes
/// it easy to see a swap land in the logs.
#[derive(Default)]
pub struct HeartbeatModule {
    beats: u64,
    counter: Option<Arc<AtomicU64>>,
}

impl HeartbeatModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the beat count into a shared counter (used by tests).
    pub fn with_counter(mut self, counter: Arc<AtomicU64>) -> Self {
        self.counter = Some(counter);
        self
    }
}

impl Module for HeartbeatModule {
    fn capabilities(&self) -> Capabilities {
        Capabilities::INIT
            .union(Capabilities::ON_ENABLE)
            .union(Capabilities::ON_DISABLE)
            .union(Capabilities::ON_UPDATE)
            .union(Capabilities::RELOAD)
    }

    fn init(&mut self) {
        self.beats = 0;
    }

    fn on_enable(&mut self) {
        debug!(target: "modules", "heartbeat running");
    }

    fn on_disable(&mut self) {
        debug!(target: "modules", "heartbeat stopped at {} beats", self.beats);
    }

    fn on_update(&mut self) -> HookOutput {
        self.beats += 1;
        if let Some(counter) = &self.counter {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        if self.beats % BEATS_PER_LOG == 0 {
            info!(target: "modules", "heartbeat: {} beats", self.beats);
        }
        HookOutput::Empty
    }
}
