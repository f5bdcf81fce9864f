//! Tasks: one tracked execution of a task function.
//!
//! A [`Task`] is the view of a task from the "outside", as returned by [`crate::Group::task`].
//! Its completion and result are determined entirely by its function: [`Task::done`] resolves
//! when the function returns or panics, and [`Task::result`] holds what it returned. Compare
//! with [`crate::Scope`], the "inside" view handed to the function, whose context behaves like
//! any other cancellation context.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::{debug, error, trace, warn};

use crate::error::TaskError;
use crate::key::{TaskFn, TaskKey};
use crate::scope::Scope;
use crate::signal::{Done, Signal};

/// Handle to a task in a group. Cheap to clone; clones compare equal.
///
/// A task starts running as soon as it is created and finishes exactly once. After that its
/// result never changes, and observing it any number of times is safe from any thread.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

struct TaskInner {
    func: TaskFn,
    signal: Signal,
    // Guarded separately from the group's registry so waiters never block lookups
    result: Mutex<Option<Result<(), TaskError>>>,
}

impl Task {
    pub(crate) fn new(func: TaskFn) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                func,
                signal: Signal::new(),
                result: Mutex::new(None),
            }),
        }
    }

    /// Execute the task function. Must be called exactly once, by the group that created the
    /// task.
    ///
    /// Panics are caught here and recorded as the task's error, so a faulting task function
    /// neither crashes the process nor leaves its waiters hanging. If the returned future is
    /// dropped before it completes (never polled, runtime shut down, spawner failure), the task
    /// finishes with [`TaskError::Aborted`] instead.
    pub(crate) fn run(self, scope: Scope) -> impl Future<Output = ()> + Send + 'static {
        // Created outside the async block so it is dropped even if the future is never polled
        let guard = RunGuard { task: self };

        async move {
            let task = &guard.task;
            let name = task.inner.func.name_arc();
            let func = task.inner.func.clone();

            // Calling the function happens inside the guarded future, so a panic before its
            // first await is caught too
            let outcome = AssertUnwindSafe(async move { func.call(scope).await })
                .catch_unwind()
                .await;

            let result = match outcome {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(TaskError::failed(name, err)),
                Err(payload) => Err(TaskError::from_panic(name, payload)),
            };

            #[cfg(feature = "tracing")]
            {
                match &result {
                    Ok(()) => trace!(task = %task.name(), "task finished"),
                    Err(err) if err.is_panic() => {
                        error!(task = %task.name(), error = %err, "task panicked")
                    }
                    Err(err) => debug!(task = %task.name(), error = %err, "task failed"),
                }
            }

            task.finish(result);
        }
    }

    /// Record that the task will never run to completion. No-op once finished.
    pub(crate) fn abort(&self) {
        if self.is_done() {
            return;
        }

        #[cfg(feature = "tracing")]
        warn!(task = %self.name(), "task dropped before finishing");

        self.finish(Err(TaskError::Aborted {
            task: self.inner.func.name_arc(),
        }));
    }

    fn finish(&self, result: Result<(), TaskError>) {
        {
            let mut slot = self.inner.result.lock();
            if slot.is_some() {
                return;
            }
            *slot = Some(result);
        }
        self.inner.signal.fire();
    }

    /// Resolves when the task function has returned or panicked, or the task was aborted.
    pub fn done(&self) -> Done {
        self.inner.signal.done()
    }

    pub fn is_done(&self) -> bool {
        self.inner.signal.is_fired()
    }

    /// The task's outcome, or `None` while it is still running.
    pub fn result(&self) -> Option<Result<(), TaskError>> {
        self.inner.result.lock().clone()
    }

    /// Wait for the task to finish and return its outcome.
    pub fn wait(&self) -> impl Future<Output = Result<(), TaskError>> + Send + 'static {
        let task = self.clone();
        async move {
            task.done().await;
            task.result().unwrap_or(Ok(()))
        }
    }

    pub fn name(&self) -> &str {
        self.inner.func.short_name()
    }

    pub fn key(&self) -> &TaskKey {
        self.inner.func.key()
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Task {}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name())
            .field("key", self.key())
            .field("result", &self.result())
            .finish()
    }
}

/// Finishes the task as aborted if its run future goes away early.
struct RunGuard {
    task: Task,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
