//! One-time configuration cache.
//!
//! The first call to [`ConfigCache::get`] searches for the project root and
//! parses the configuration file; every later call, from any thread, observes
//! the same result. Failures are cached too, so a missing or broken
//! configuration fails every resolver identically until the process restarts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use crate::config::loader::{load_config, ConfigError, LoadedConfig};

type CachedLoad = Result<Arc<LoadedConfig>, Arc<ConfigError>>;

/// Lazily loaded, never invalidated configuration snapshot.
#[derive(Debug)]
pub struct ConfigCache {
    start: PathBuf,
    cell: OnceLock<CachedLoad>,
    loads: AtomicUsize,
}

impl ConfigCache {
    /// Create a cache that searches upward from `start` on first use.
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            start: start.into(),
            cell: OnceLock::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Create a cache that searches upward from the running executable's directory.
    pub fn from_executable() -> Self {
        let start = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(start)
    }

    /// Create an already-primed cache. No filesystem access ever happens.
    pub fn preloaded(loaded: LoadedConfig) -> Self {
        let root = loaded.root.clone();
        Self {
            start: root,
            cell: OnceLock::from(Ok(Arc::new(loaded))),
            loads: AtomicUsize::new(0),
        }
    }

    /// Get the configuration, loading it on first call.
    ///
    /// Concurrent first callers block until the single load finishes.
    pub fn get(&self) -> Result<Arc<LoadedConfig>, Arc<ConfigError>> {
        self.cell.get_or_init(|| self.load()).clone()
    }

    /// Whether the configuration has been loaded (successfully or not).
    pub fn is_primed(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Number of times the configuration file has been read. Never exceeds 1.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Directory the root search starts from.
    pub fn start_dir(&self) -> &Path {
        &self.start
    }

    fn load(&self) -> CachedLoad {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match load_config(&self.start) {
            Ok(loaded) => {
                tracing::info!(
                    root = %loaded.root.display(),
                    paths = loaded.config.paths.aliases.len(),
                    imports = loaded.config.imports.len(),
                    modules = loaded.config.modules.len(),
                    "Configuration loaded"
                );
                Ok(Arc::new(loaded))
            }
            Err(e) => {
                tracing::error!(start = %self.start.display(), error = %e, "Failed to load configuration");
                Err(Arc::new(e))
            }
        }
    }
}
