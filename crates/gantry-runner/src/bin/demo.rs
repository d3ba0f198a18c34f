//! Runs the built-in demo app for a fixed number of frames.
//!
//! Exercises the whole stack: app launch, context start, the frame
//! loop, the reload transport, and teardown.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use gantry_events::LoggingListener;
use gantry_kernel::{ModuleHost, PathKeyResolver, ReloadBridge};
use gantry_runner::{
    apply_changes, config::RuntimeConfig, frame::FrameDriver, launcher, logging, modules,
    reload::setup_reload_signal, watcher::ResourceScanner, ReloadAction,
};

#[derive(Parser)]
#[command(name = "gantry-demo", about = "Run the gantry demo app")]
struct Args {
    /// Path to a runtime config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to run before exiting
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Also log to a file under the data directory
    #[arg(long)]
    log_file: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig {
            app: Some(modules::DEMO_APP_KEY.to_string()),
            ..Default::default()
        },
    };
    let _guard = logging::init_logging("demo", args.log_file || config.log_to_file)?;

    let mut host = ModuleHost::new(modules::demo_source());
    host.add_listener(LoggingListener);

    launcher::boot(&mut host, &config).await?;

    let watch_dir = config.reload.watch_dir();
    let mut scanner = config.reload.enabled.then(|| {
        ResourceScanner::with_interval(
            watch_dir.clone(),
            config.reload.extension.clone(),
            config.reload.scan_interval(),
        )
    });
    let bridge = ReloadBridge::new(PathKeyResolver::new(
        watch_dir,
        config.reload.extension.as_str(),
    ));
    let mut restart_rx = setup_reload_signal();

    let mut driver = FrameDriver::new();
    for _ in 0..args.frames {
        driver.tick(&mut host);

        let mut restart = restart_rx.borrow_and_update().is_some();
        if let Some(scanner) = scanner.as_mut() {
            if scanner.should_scan() {
                let result = scanner.scan();
                for action in apply_changes(
                    &mut host,
                    &bridge,
                    config.reload.strategy,
                    &result.changed,
                ) {
                    match action {
                        ReloadAction::Restart => restart = true,
                        ReloadAction::Bridged(outcome) => {
                            info!(target: "reload", "bridge outcome: {:?}", outcome);
                        }
                    }
                }
            }
        }
        if restart {
            if let Some(app_key) = &config.app {
                launcher::restart_app(&mut host, app_key).await?;
            }
        }

        host.process_completions();
        tokio::time::sleep(driver.tick_interval()).await;
    }

    for status in host.statuses() {
        info!(
            target: "demo",
            "{} [{}] {:?}",
            status.key,
            status.context,
            status.state
        );
    }

    if let Some(app_key) = &config.app {
        launcher::end_app(&mut host, app_key);
    }
    Ok(())
}
