//! Detached background tasks launched at startup.
//!
//! Threads are never joined or cancelled. Their handles are kept so that
//! shutdown can give them a grace period and report the ones it abandons.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::registry::Callable;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct BackgroundHandle {
    task: String,
    handle: JoinHandle<()>,
}

/// Registry of background task threads.
#[derive(Debug, Default)]
pub struct BackgroundTasks {
    handles: Mutex<Vec<BackgroundHandle>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch `callable` on its own named thread and return immediately.
    ///
    /// Errors and panics inside the task are logged from that thread only.
    pub fn spawn(&self, task: &str, callable: Callable) -> std::io::Result<()> {
        let name = task.to_string();
        let handle = thread::Builder::new()
            .name(format!("task-{}", task))
            .spawn(move || run_detached(&name, &callable))?;

        self.lock().push(BackgroundHandle {
            task: task.to_string(),
            handle,
        });
        Ok(())
    }

    /// Names of tasks whose threads are still running.
    pub fn running(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|h| !h.handle.is_finished())
            .map(|h| h.task.clone())
            .collect()
    }

    /// Wait up to `grace` for all tasks to finish, then detach everything.
    ///
    /// Returns the tasks that were still running when the grace period ended.
    pub fn abandon(&self, grace: Duration) -> Vec<String> {
        let deadline = Instant::now() + grace;
        while Instant::now() < deadline && !self.running().is_empty() {
            thread::sleep(POLL_INTERVAL);
        }

        let handles = std::mem::take(&mut *self.lock());
        let abandoned: Vec<String> = handles
            .into_iter()
            .filter(|h| !h.handle.is_finished())
            .map(|h| h.task)
            .collect();

        for task in &abandoned {
            tracing::warn!(task = %task, "Background task still running at shutdown, abandoning");
        }
        abandoned
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<BackgroundHandle>> {
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn run_detached(task: &str, callable: &Callable) {
    tracing::debug!(task = %task, target_fn = %callable.name(), "Background task started");
    match panic::catch_unwind(AssertUnwindSafe(|| callable.invoke())) {
        Ok(Ok(_)) => tracing::debug!(task = %task, "Background task finished"),
        Ok(Err(e)) => tracing::error!(task = %task, error = %format!("{:#}", e), "Background task failed"),
        Err(payload) => {
            tracing::error!(task = %task, panic = %panic_message(&*payload), "Background task panicked")
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
