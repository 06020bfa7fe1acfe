//! Alias resolution.
//!
//! # Data Flow
//! ```text
//! resolve_path(alias)   → paths.aliases[alias] → root.join(value) → normalized absolute path
//! resolve_import(alias) → imports[alias] = "module.attr" → Registry::load(module) → attr
//! resolve_module(alias) → modules[alias] = "module"      → Registry::load(module)
//! ```
//!
//! # Design Decisions
//! - Configuration is loaded lazily by the first resolver call, never earlier
//! - An unknown alias reports every alias of the same kind
//! - A declared alias with no value is unknown; an empty path is the project root

pub mod path;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::{AliasTable, ConfigCache, ConfigError, LoadedConfig};
use crate::registry::{Callable, Module, Registry, RegistryError};

/// The three alias namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Path,
    Import,
    Module,
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasKind::Path => write!(f, "path"),
            AliasKind::Import => write!(f, "import"),
            AliasKind::Module => write!(f, "module"),
        }
    }
}

/// Error type for alias resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Config(Arc<ConfigError>),

    #[error("{kind} alias '{alias}' not found. Available: {available:?}")]
    UnknownAlias {
        kind: AliasKind,
        alias: String,
        available: Vec<String>,
    },

    #[error("{kind} alias '{alias}' has invalid target '{target}'")]
    InvalidTarget {
        kind: AliasKind,
        alias: String,
        target: String,
    },

    #[error("failed to load module '{module}': {source}")]
    ModuleLoad {
        module: String,
        #[source]
        source: RegistryError,
    },

    #[error("module '{module}' has no attribute '{attribute}'")]
    AttributeNotFound { module: String, attribute: String },
}

impl From<Arc<ConfigError>> for ResolveError {
    fn from(e: Arc<ConfigError>) -> Self {
        ResolveError::Config(e)
    }
}

/// Resolves path, import and module aliases against one configuration snapshot.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: Arc<ConfigCache>,
    registry: Arc<Registry>,
}

impl Resolver {
    pub fn new(config: Arc<ConfigCache>, registry: Arc<Registry>) -> Self {
        Self { config, registry }
    }

    /// The configuration snapshot, loading it on first use.
    pub fn config(&self) -> Result<Arc<LoadedConfig>, ResolveError> {
        Ok(self.config.get()?)
    }

    pub fn cache(&self) -> &ConfigCache {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a path alias to an absolute path under the project root.
    ///
    /// The target is not required to exist.
    pub fn resolve_path(&self, alias: &str) -> Result<PathBuf, ResolveError> {
        let loaded = self.config()?;
        let relative = lookup(&loaded.config.paths.aliases, AliasKind::Path, alias)?;
        Ok(path::resolve_against(&loaded.root, Path::new(relative)))
    }

    /// Resolve an import alias to the callable it names.
    pub fn resolve_import(&self, alias: &str) -> Result<Callable, ResolveError> {
        let loaded = self.config()?;
        let target = lookup(&loaded.config.imports, AliasKind::Import, alias)?;

        let (module_path, attribute) = match target.rsplit_once('.') {
            Some((m, a)) if !m.is_empty() && !a.is_empty() => (m, a),
            _ => {
                return Err(ResolveError::InvalidTarget {
                    kind: AliasKind::Import,
                    alias: alias.to_string(),
                    target: target.to_string(),
                })
            }
        };

        let module = self.load_module(module_path)?;
        module
            .attr(attribute)
            .ok_or_else(|| ResolveError::AttributeNotFound {
                module: module_path.to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Resolve a module alias to the loaded module.
    pub fn resolve_module(&self, alias: &str) -> Result<Arc<Module>, ResolveError> {
        let loaded = self.config()?;
        let target = lookup(&loaded.config.modules, AliasKind::Module, alias)?;
        if target.is_empty() {
            return Err(ResolveError::InvalidTarget {
                kind: AliasKind::Module,
                alias: alias.to_string(),
                target: String::new(),
            });
        }
        self.load_module(target)
    }

    fn load_module(&self, module_path: &str) -> Result<Arc<Module>, ResolveError> {
        self.registry
            .load(module_path)
            .map_err(|source| ResolveError::ModuleLoad {
                module: module_path.to_string(),
                source,
            })
    }
}

/// Look up `alias`, treating a declared-but-null value as unknown.
fn lookup<'a>(table: &'a AliasTable, kind: AliasKind, alias: &str) -> Result<&'a str, ResolveError> {
    match table.get(alias) {
        Some(Some(value)) => Ok(value.as_str()),
        _ => Err(ResolveError::UnknownAlias {
            kind,
            alias: alias.to_string(),
            available: table.keys().cloned().collect(),
        }),
    }
}
