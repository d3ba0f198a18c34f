//! Application switching over the module host.
//!
//! An app is a module that declares the modules it wants through the
//! module-config hook. Launching loads the app module, requests every
//! declared entry under the app's own context, waits for the loads,
//! runs context init and enables the entries marked enabled. Ending
//! an app tears the whole context down again.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde_json::Value;
use tracing::{info, warn};

use gantry_kernel::{Hook, HookOutput, ModuleHost};

use crate::config::RuntimeConfig;

/// Load boot modules from the config, then launch the configured app
/// (if any).
pub async fn boot(host: &mut ModuleHost, config: &RuntimeConfig) -> Result<()> {
    for entry in &config.modules {
        host.request_load(&entry.key, entry.context());
    }
    host.run_until_loaded().await;
    for entry in &config.modules {
        host.init(&entry.key);
    }
    for entry in &config.modules {
        if entry.enabled {
            host.enable(&entry.key);
        }
    }

    if let Some(app_key) = &config.app {
        launch_app(host, app_key).await?;
    }
    Ok(())
}

/// Launch the app registered under `app_key`.
///
/// The app module and every module it declares share `app_key` as
/// their context, so the group can be stopped or restarted as one.
pub async fn launch_app(host: &mut ModuleHost, app_key: &str) -> Result<()> {
    info!(target: "launcher", "launching app {}", app_key);

    host.request_load(app_key, app_key);
    host.run_until_loaded().await;
    if !host
        .registry()
        .get(app_key)
        .is_some_and(|record| record.has_handle())
    {
        bail!("app module {} failed to load", app_key);
    }

    let entries = module_entries(host, app_key)?;
    for key in entries.keys() {
        host.request_load(key, app_key);
    }
    host.run_until_loaded().await;

    // Everything the app asked for is resolved (or failed); init the
    // whole group, then enable the entries the app marked enabled.
    host.init_context(app_key);
    host.enable(app_key);
    for (key, entry) in &entries {
        let wanted = entry
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if wanted {
            host.enable(key);
        }
    }

    host.invoke(app_key, Hook::LaunchApp);
    Ok(())
}

/// End the app: `end_app` hook first, then disable its whole context.
pub fn end_app(host: &mut ModuleHost, app_key: &str) {
    info!(target: "launcher", "ending app {}", app_key);
    host.invoke(app_key, Hook::EndApp);
    host.disable_context(app_key);
}

/// Restart the app in place (the restart-all reload strategy).
pub async fn restart_app(host: &mut ModuleHost, app_key: &str) -> Result<()> {
    end_app(host, app_key);
    launch_app(host, app_key).await
}

fn module_entries(host: &mut ModuleHost, app_key: &str) -> Result<BTreeMap<String, Value>> {
    match host.invoke(app_key, Hook::ModuleConfig) {
        HookOutput::Map(entries) => Ok(entries),
        HookOutput::Empty => {
            warn!(target: "launcher", "app {} declares no modules", app_key);
            Ok(BTreeMap::new())
        }
        HookOutput::List(_) => bail!("app {} returned a list-shaped module config", app_key),
    }
}
