//! Registered modules and their callable attributes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::Value;

type CallableFn = dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync;
type Initializer = dyn Fn() -> anyhow::Result<()> + Send + Sync;

/// A named function or constructor exposed by a [`Module`].
#[derive(Clone)]
pub struct Callable {
    name: String,
    func: Arc<CallableFn>,
}

impl Callable {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Fully qualified name, e.g. `app.io.write_log`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.func)(args)
    }

    /// Call with no arguments, the way lifecycle tasks are run.
    pub fn invoke(&self) -> anyhow::Result<Value> {
        self.call(&[])
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("name", &self.name).finish()
    }
}

/// A statically registered module: a dotted path, its attributes, and an
/// optional initializer that runs on first load.
pub struct Module {
    path: String,
    attrs: BTreeMap<String, Callable>,
    init: Option<Box<Initializer>>,
    initialized: Mutex<bool>,
}

impl Module {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            attrs: BTreeMap::new(),
            init: None,
            initialized: Mutex::new(false),
        }
    }

    /// Add a function attribute.
    pub fn with_function<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let qualified = format!("{}.{}", self.path, name);
        self.attrs.insert(name.to_string(), Callable::new(qualified, func));
        self
    }

    /// Add a no-argument task attribute.
    pub fn with_task<F>(self, name: &str, task: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with_function(name, move |_| task().map(|()| Value::Null))
    }

    /// Set the code that runs the first time this module is loaded.
    pub fn with_initializer<F>(mut self, init: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn attr(&self, name: &str) -> Option<Callable> {
        self.attrs.get(name).cloned()
    }

    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    pub fn is_initialized(&self) -> bool {
        *self.initialized.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run the initializer unless it already succeeded.
    ///
    /// The lock is held while the initializer runs, so concurrent loaders wait
    /// for it. A failed initializer leaves the module uninitialized.
    pub(crate) fn ensure_initialized(&self) -> anyhow::Result<()> {
        let mut initialized = self.initialized.lock().unwrap_or_else(|e| e.into_inner());
        if *initialized {
            return Ok(());
        }
        if let Some(init) = &self.init {
            tracing::debug!(module = %self.path, "Initializing module");
            init()?;
        }
        *initialized = true;
        Ok(())
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("path", &self.path)
            .field("attrs", &self.attrs.keys().collect::<Vec<_>>())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_function_receives_args() {
        let module = Module::new("app.math").with_function("add", |args| {
            let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok(Value::from(sum))
        });
        let add = module.attr("add").unwrap();
        assert_eq!(add.name(), "app.math.add");
        assert_eq!(add.call(&[Value::from(2), Value::from(3)]).unwrap(), Value::from(5));
        assert!(module.attr("sub").is_none());
    }

    #[test]
    fn test_task_returns_null() {
        let module = Module::new("app.tasks").with_task("noop", || Ok(()));
        assert_eq!(module.attr("noop").unwrap().invoke().unwrap(), Value::Null);
    }

    #[test]
    fn test_initializer_retries_until_success() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let module = Module::new("flaky").with_initializer(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("first attempt fails");
            }
            Ok(())
        });

        assert!(module.ensure_initialized().is_err());
        assert!(!module.is_initialized());
        module.ensure_initialized().unwrap();
        module.ensure_initialized().unwrap();
        assert!(module.is_initialized());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
