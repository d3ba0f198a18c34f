//! The per-frame driver.
//!
//! The kernel only gates which modules a frame driver may call; this
//! is that driver. Each tick broadcasts the update hook, merges the
//! render-phase producers into a scene payload and feeds it to the
//! render consumers. Disabled modules never hear any of it.

use std::time::{Duration, Instant};

use gantry_kernel::{Hook, ModuleHost};

/// Default tick rate (16ms ~ 60Hz).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

pub struct FrameDriver {
    tick_interval: Duration,
    last_tick: Option<Instant>,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_INTERVAL)
    }

    pub fn with_tick_rate(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            last_tick: None,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Run a frame if the tick interval has elapsed. Returns whether a
    /// frame ran.
    pub fn try_tick(&mut self, host: &mut ModuleHost) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_tick {
            if now.duration_since(last) < self.tick_interval {
                return false;
            }
        }
        self.last_tick = Some(now);
        self.run_frame(host);
        true
    }

    /// Run a frame unconditionally.
    pub fn tick(&mut self, host: &mut ModuleHost) {
        self.last_tick = Some(Instant::now());
        self.run_frame(host);
    }

    fn run_frame(&mut self, host: &mut ModuleHost) {
        host.broadcast(Hook::OnUpdate);
        let scene = host
            .broadcast(Hook::BeforeRenderEarly)
            .merge(host.broadcast(Hook::BeforeRenderLate));
        host.broadcast_input(Hook::OnRender, &scene);
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::HeartbeatModule;
    use gantry_kernel::{FactorySource, ModuleHost};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    async fn heartbeat_host(counter: &Arc<AtomicU64>) -> ModuleHost {
        let counter = counter.clone();
        let source = FactorySource::new().with("demo/heartbeat", move || {
            Box::new(HeartbeatModule::new().with_counter(counter.clone()))
        });
        let mut host = ModuleHost::new(source);
        host.request_load("demo/heartbeat", "demo");
        host.run_until_loaded().await;
        host
    }

    #[tokio::test]
    async fn test_tick_only_reaches_enabled_modules() {
        let counter = Arc::new(AtomicU64::new(0));
        let mut host = heartbeat_host(&counter).await;
        let mut driver = FrameDriver::new();

        driver.tick(&mut host);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        host.enable("demo/heartbeat");
        driver.tick(&mut host);
        driver.tick(&mut host);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        host.disable("demo/heartbeat");
        driver.tick(&mut host);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_try_tick_gates_on_interval() {
        let counter = Arc::new(AtomicU64::new(0));
        let mut host = heartbeat_host(&counter).await;
        host.enable("demo/heartbeat");

        let mut driver = FrameDriver::with_tick_rate(Duration::from_secs(60));
        assert!(driver.try_tick(&mut host));
        // Way inside the interval; nothing may run.
        assert!(!driver.try_tick(&mut host));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
