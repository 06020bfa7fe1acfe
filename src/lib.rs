//! Alias resolution for paths, import targets and modules declared in
//! `dynamics/config.yaml`, plus the startup and shutdown task hooks declared
//! in the same file.

pub mod app;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod resolve;

pub use config::{AliasConfig, ConfigCache, ConfigError, LoadedConfig, ANCHOR_FILE};
pub use http::HttpServer;
pub use lifecycle::{LifecycleError, Shutdown, ShutdownReport, TaskRunner};
pub use registry::{Callable, Module, Registry, RegistryError};
pub use resolve::{AliasKind, ResolveError, Resolver};
