//! Startup orchestration.
//!
//! # Responsibilities
//! - Run `on_startup.non-thread` tasks in order, on the calling thread
//! - Launch `on_startup.threading` tasks on detached threads
//!
//! # Design Decisions
//! - Fail fast: any synchronous task error is fatal
//! - Threaded tasks are not awaited and their failures are not reported

use std::sync::atomic::Ordering;

use crate::config::validation::{validate_config, ValidationError};
use crate::lifecycle::{LifecycleError, Phase, TaskRunner};

impl TaskRunner {
    /// Load the configuration and log validation findings as warnings.
    ///
    /// Advisory only: findings never fail, so a bad task reference still
    /// surfaces from [`TaskRunner::run_startup_tasks`] with its explanation
    /// already logged. Does not count as running startup.
    pub fn preflight(&self) -> Result<Vec<ValidationError>, LifecycleError> {
        let loaded = self.resolver.config().map_err(|e| LifecycleError::resolve(Phase::Startup, "", e))?;
        let findings = validate_config(&loaded.config).err().unwrap_or_default();
        for finding in &findings {
            tracing::warn!(config = %loaded.config_path().display(), "{}", finding);
        }
        Ok(findings)
    }

    /// Run the configured startup tasks.
    ///
    /// Returns once every synchronous task has completed and every background
    /// task has been launched.
    pub fn run_startup_tasks(&self) -> Result<(), LifecycleError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(LifecycleError::AlreadyRan(Phase::Startup));
        }

        let loaded = self.resolver.config().map_err(|e| LifecycleError::resolve(Phase::Startup, "", e))?;
        let startup = &loaded.config.background_tasks.on_startup;

        for task in &startup.non_thread {
            let callable = self
                .resolver
                .resolve_import(task)
                .map_err(|e| LifecycleError::resolve(Phase::Startup, task, e))?;

            tracing::info!(task = %task, target_fn = %callable.name(), "Running startup task");
            callable.invoke().map_err(|e| LifecycleError::Task {
                phase: Phase::Startup,
                task: task.clone(),
                source: e.into(),
            })?;
        }

        for task in &startup.threading {
            let callable = self
                .resolver
                .resolve_import(task)
                .map_err(|e| LifecycleError::resolve(Phase::Startup, task, e))?;

            tracing::info!(task = %task, target_fn = %callable.name(), "Launching background task");
            self.background
                .spawn(task, callable)
                .map_err(|source| LifecycleError::Spawn {
                    task: task.clone(),
                    source,
                })?;
        }

        Ok(())
    }
}
