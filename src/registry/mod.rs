//! Module registry.
//!
//! Import targets in the configuration are dotted strings. There is no
//! runtime symbol lookup, so every loadable module is registered up front
//! and the resolvers look targets up here.
//!
//! # Data Flow
//! ```text
//! startup: app::registry() / tests
//!     → Registry::register(Module) for each module path
//!     → Arc<Registry> handed to the Resolver
//!
//! resolve_import("write_log")
//!     → "app.io.write_log" split into ("app.io", "write_log")
//!     → Registry::load("app.io") (initializes "app", then "app.io")
//!     → Module::attr("write_log")
//! ```

pub mod module;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

pub use module::{Callable, Module};

/// Failure to load a registered module.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no module named '{0}'")]
    ModuleNotFound(String),

    #[error("module '{module}' failed to initialize: {reason}")]
    InitFailed { module: String, reason: String },
}

/// Dotted module path to registered module.
#[derive(Debug, Default)]
pub struct Registry {
    modules: HashMap<String, Arc<Module>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under its path, replacing any previous registration.
    pub fn register(&mut self, module: Module) -> &mut Self {
        let path = module.path().to_string();
        if self.modules.insert(path.clone(), Arc::new(module)).is_some() {
            tracing::warn!(module = %path, "Module registered twice, keeping the latest");
        }
        self
    }

    /// Registered module paths, sorted.
    pub fn module_paths(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.modules.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Load a module, initializing it and its registered parent packages first.
    pub fn load(&self, path: &str) -> Result<Arc<Module>, RegistryError> {
        let module = self
            .modules
            .get(path)
            .ok_or_else(|| RegistryError::ModuleNotFound(path.to_string()))?;

        for parent in parent_paths(path) {
            if let Some(package) = self.modules.get(parent) {
                init(package)?;
            }
        }
        init(module)?;

        Ok(module.clone())
    }
}

fn init(module: &Module) -> Result<(), RegistryError> {
    module.ensure_initialized().map_err(|e| RegistryError::InitFailed {
        module: module.path().to_string(),
        reason: format!("{:#}", e),
    })
}

/// `"a.b.c"` → `["a", "a.b"]`, outermost first.
fn parent_paths(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('.').map(move |(i, _)| &path[..i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_parent_paths() {
        assert_eq!(parent_paths("a.b.c").collect::<Vec<_>>(), vec!["a", "a.b"]);
        assert_eq!(parent_paths("solo").count(), 0);
    }

    #[test]
    fn test_load_unknown_module() {
        let registry = Registry::new();
        let err = registry.load("nope.nothing").unwrap_err();
        assert!(matches!(err, RegistryError::ModuleNotFound(ref m) if m == "nope.nothing"));
    }

    #[test]
    fn test_load_initializes_parents_first_and_once() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (order.clone(), order.clone());

        let mut registry = Registry::new();
        registry
            .register(Module::new("app").with_initializer(move || {
                a.lock().unwrap().push("app");
                Ok(())
            }))
            .register(Module::new("app.io").with_initializer(move || {
                b.lock().unwrap().push("app.io");
                Ok(())
            }));

        let first = registry.load("app.io").unwrap();
        let second = registry.load("app.io").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*order.lock().unwrap(), vec!["app", "app.io"]);
        assert_eq!(registry.module_paths(), vec!["app", "app.io"]);
    }

    #[test]
    fn test_failed_parent_blocks_child() {
        let mut registry = Registry::new();
        registry
            .register(Module::new("pkg").with_initializer(|| anyhow::bail!("boom")))
            .register(Module::new("pkg.child"));

        let err = registry.load("pkg.child").unwrap_err();
        match err {
            RegistryError::InitFailed { module, reason } => {
                assert_eq!(module, "pkg");
                assert!(reason.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
