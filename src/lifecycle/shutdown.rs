//! Shutdown coordination.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::lifecycle::background::panic_message;
use crate::lifecycle::{LifecycleError, Phase, TaskRunner};

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the HTTP server and any other
/// long-running async work can subscribe to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// A shutdown task that could not be resolved or that failed when run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: String,
    pub error: String,
}

/// Outcome of [`TaskRunner::run_shutdown_tasks`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tasks that ran to completion, in order.
    pub completed: Vec<String>,
    /// Tasks that failed, in order.
    pub failed: Vec<TaskFailure>,
    /// Background startup tasks still running when shutdown finished.
    pub abandoned: Vec<String>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.abandoned.is_empty()
    }
}

impl TaskRunner {
    /// Run the configured shutdown tasks.
    ///
    /// Each task is isolated: a resolution error, a returned error or a panic
    /// is logged and recorded, and the next task still runs. Only a
    /// configuration failure aborts, since no task list can be read.
    pub fn run_shutdown_tasks(&self) -> Result<ShutdownReport, LifecycleError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Err(LifecycleError::AlreadyRan(Phase::Shutdown));
        }

        let loaded = self.resolver.config().map_err(|e| LifecycleError::resolve(Phase::Shutdown, "", e))?;
        let tasks = &loaded.config.background_tasks;
        let mut report = ShutdownReport::default();

        for task in &tasks.on_shutdown {
            match self.run_isolated(task) {
                Ok(()) => report.completed.push(task.clone()),
                Err(error) => {
                    tracing::error!(task = %task, error = %error, "Failed to run shutdown task");
                    report.failed.push(TaskFailure {
                        task: task.clone(),
                        error,
                    });
                }
            }
        }

        report.abandoned = self
            .background
            .abandon(Duration::from_millis(tasks.shutdown_grace_ms));

        tracing::info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            abandoned = report.abandoned.len(),
            "Shutdown tasks finished"
        );
        Ok(report)
    }

    fn run_isolated(&self, task: &str) -> Result<(), String> {
        let callable = self.resolver.resolve_import(task).map_err(|e| e.to_string())?;
        tracing::info!(task = %task, target_fn = %callable.name(), "Running shutdown task");

        match panic::catch_unwind(AssertUnwindSafe(|| callable.invoke())) {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(payload) => Err(format!("panicked: {}", panic_message(&*payload))),
        }
    }
}
