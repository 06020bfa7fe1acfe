//! Built-in modules referenced by `dynamics/config.yaml`.
//!
//! Every import or module target the shipped configuration names must be
//! registered here; [`registry`] is the explicit initialization step the
//! binary runs before any alias is resolved.

use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::registry::{Module, Registry};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Build the registry of built-in modules.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(app()).register(io()).register(tasks());
    registry
}

fn app() -> Module {
    Module::new("app").with_initializer(|| {
        tracing::debug!("app package loaded");
        Ok(())
    })
}

/// `app.io`: log writing.
fn io() -> Module {
    Module::new("app.io").with_function("write_log", write_log)
}

/// `app.tasks`: lifecycle tasks.
fn tasks() -> Module {
    Module::new("app.tasks")
        .with_task("announce", || {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "Application starting");
            Ok(())
        })
        .with_task("heartbeat", || loop {
            thread::sleep(HEARTBEAT_INTERVAL);
            tracing::info!("heartbeat");
        })
        .with_task("farewell", || {
            tracing::info!("Application stopping");
            Ok(())
        })
}

/// `write_log(message)`: emit `message` as an application log line.
fn write_log(args: &[Value]) -> anyhow::Result<Value> {
    let message = match args.first() {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => anyhow::bail!("write_log expects a message argument"),
    };
    tracing::info!("{}", message);
    Ok(Value::Null)
}
