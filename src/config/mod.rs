//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! start directory
//!     → loader.rs (walk ancestors for dynamics/config.yaml, parse YAML)
//!     → cache.rs (first call only; result memoized for the process)
//!     → LoadedConfig { config, root } (immutable, shared via Arc)
//!     → resolvers and task runner
//!
//! validation.rs runs over a loaded document and reports advisory findings.
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All sections have defaults to allow minimal configs
//! - Load failures are cached and shared, not retried

pub mod cache;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cache::ConfigCache;
pub use loader::{ConfigError, LoadedConfig, ANCHOR_FILE};
pub use schema::{AliasConfig, AliasTable, BackgroundTasksConfig, PathsConfig, StartupTasksConfig};
