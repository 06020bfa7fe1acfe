//! Shared utilities for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alias_resolver::{ConfigCache, Module, Registry, Resolver, ANCHOR_FILE};
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway project directory holding `dynamics/config.yaml`.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let anchor = dir.path().join(ANCHOR_FILE);
        fs::create_dir_all(anchor.parent().unwrap()).unwrap();
        fs::write(anchor, config).unwrap();
        Self { dir }
    }

    /// Canonical project root.
    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }

    /// Create (and return) a subdirectory to start the root search from.
    pub fn subdir(&self, rel: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn resolver(&self, registry: Registry) -> Arc<Resolver> {
        resolver_from(self.dir.path(), registry)
    }
}

pub fn resolver_from(start: &Path, registry: Registry) -> Arc<Resolver> {
    Arc::new(Resolver::new(
        Arc::new(ConfigCache::new(start)),
        Arc::new(registry),
    ))
}

/// Ordered record of which test tasks ran.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

/// Registry with:
/// - `app.io.write_log` / `app.io.echo`
/// - `app.tasks.{first,second,third}` that record into `log`
/// - `app.tasks.fail` (returns an error) and `app.tasks.explode` (panics)
/// - `app.lazy`, whose initializer counts into `inits`
pub fn test_registry(log: &CallLog, inits: &Arc<AtomicUsize>) -> Registry {
    let mut tasks = Module::new("app.tasks");
    for name in ["first", "second", "third"] {
        let log = log.clone();
        tasks = tasks.with_task(name, move || {
            log.record(name);
            Ok(())
        });
    }
    let fail_log = log.clone();
    tasks = tasks
        .with_task("fail", move || {
            fail_log.record("fail");
            anyhow::bail!("task failed on purpose")
        })
        .with_task("explode", || panic!("task exploded"));

    let inits = inits.clone();
    let mut registry = Registry::new();
    registry
        .register(
            Module::new("app.io")
                .with_function("write_log", |_| Ok(Value::Null))
                .with_function("echo", |args| Ok(args.first().cloned().unwrap_or(Value::Null))),
        )
        .register(tasks)
        .register(Module::new("app.lazy").with_initializer(move || {
            inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
    registry
}
