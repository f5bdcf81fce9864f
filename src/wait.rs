//! Fail-fast waiting on a dynamic set of tasks.
//!
//! Similar to a join over all tasks, but returns on the first error while the other tasks are
//! still running, without cancelling anything. Tasks are a graph, not a tree, and don't own
//! each other. It's possible and reasonable to have:
//!
//! ```text
//! A -> par(B, C)
//! D -> par(opt(B), C)
//! B fails -> A stops waiting, D keeps waiting on C
//! ```
//!
//! Giving up early only ends *this* wait. The abandoned tasks finish on their own, and their
//! results stay available to every other waiter.

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;

use crate::error::TaskError;
use crate::task::Task;

/// Single-use aggregation over a set of tasks, built with [`MultiWait::add`] and consumed by
/// [`MultiWait::wait`].
#[derive(Default)]
#[must_use = "a MultiWait does nothing until `wait` is awaited"]
pub struct MultiWait {
    pending: FuturesUnordered<BoxFuture<'static, Result<(), TaskError>>>,
}

impl MultiWait {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch another task.
    pub fn add(&mut self, task: &Task) {
        self.pending.push(task.wait().boxed());
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Wait until a watched task fails, returning its error, or until all of them succeed.
    ///
    /// Finished tasks are dropped from the set as they complete, so the remaining ones are
    /// re-polled without rescanning. An empty set resolves immediately.
    pub async fn wait(mut self) -> Result<(), TaskError> {
        while let Some(result) = self.pending.next().await {
            result?;
        }
        Ok(())
    }
}

impl Extend<Task> for MultiWait {
    fn extend<I: IntoIterator<Item = Task>>(&mut self, tasks: I) {
        for task in tasks {
            self.add(&task);
        }
    }
}

impl FromIterator<Task> for MultiWait {
    fn from_iter<I: IntoIterator<Item = Task>>(tasks: I) -> Self {
        let mut wait = Self::new();
        wait.extend(tasks);
        wait
    }
}

impl std::fmt::Debug for MultiWait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiWait")
            .field("pending", &self.pending.len())
            .finish()
    }
}
