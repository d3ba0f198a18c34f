//! Built-in demo modules.
//!
//! Small but real modules used by the demo binary and the integration
//! tests; deployments register their own factories instead.

pub mod demo_app;
pub mod heartbeat;
pub mod overlay;

pub use demo_app::DemoApp;
pub use heartbeat::HeartbeatModule;
pub use overlay::OverlayModule;

use gantry_kernel::FactorySource;

/// Key of the built-in demo app.
pub const DEMO_APP_KEY: &str = "apps/demo";

/// Factory table holding the demo app and the modules it declares.
pub fn demo_source() -> FactorySource {
    FactorySource::new()
        .with(DEMO_APP_KEY, || Box::new(DemoApp::new()))
        .with("demo/heartbeat", || Box::new(HeartbeatModule::new()))
        .with("demo/overlay", || Box::new(OverlayModule::new()))
}
