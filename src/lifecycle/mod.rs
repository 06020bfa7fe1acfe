//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     background_tasks.on_startup.non-thread → resolve → run in order (first failure aborts)
//!     background_tasks.on_startup.threading  → resolve → spawn detached thread (background.rs)
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → server drains → on_shutdown tasks run in order,
//!     each isolated → background threads given a grace period, then abandoned
//! ```
//!
//! # Design Decisions
//! - Startup fails fast: a broken synchronous task prevents serving
//! - Shutdown never fails fast: every listed task gets an attempt
//! - Background tasks are tracked only to report what is abandoned at exit

pub mod background;
pub mod shutdown;
pub mod signals;
pub mod startup;

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ConfigError;
use crate::resolve::{ResolveError, Resolver};

pub use background::BackgroundTasks;
pub use shutdown::{Shutdown, ShutdownReport, TaskFailure};

/// Which lifecycle phase a task list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Startup,
    Shutdown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Startup => write!(f, "startup"),
            Phase::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Error type for running lifecycle tasks.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(Arc<ConfigError>),

    #[error("failed to resolve {phase} task '{task}': {source}")]
    Resolve {
        phase: Phase,
        task: String,
        #[source]
        source: ResolveError,
    },

    #[error("{phase} task '{task}' failed: {source}")]
    Task {
        phase: Phase,
        task: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to spawn background task '{task}': {source}")]
    Spawn {
        task: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} tasks have already run")]
    AlreadyRan(Phase),
}

impl LifecycleError {
    fn resolve(phase: Phase, task: &str, source: ResolveError) -> Self {
        match source {
            ResolveError::Config(e) => LifecycleError::Config(e),
            source => LifecycleError::Resolve {
                phase,
                task: task.to_string(),
                source,
            },
        }
    }
}

/// Runs the startup and shutdown task lists from the configuration.
///
/// Each phase runs at most once per runner.
#[derive(Debug)]
pub struct TaskRunner {
    resolver: Arc<Resolver>,
    background: BackgroundTasks,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl TaskRunner {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self {
            resolver,
            background: BackgroundTasks::new(),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Background tasks launched by startup.
    pub fn background(&self) -> &BackgroundTasks {
        &self.background
    }
}
