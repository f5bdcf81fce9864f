//! Runtime-agnostic task spawning.
//!
//! Each task runs on its own independently scheduled thread of execution. The group does not
//! care which runtime provides it; it hands every task future to a [`Spawner`]:
//!
//! - Tokio: `Spawner::new(|fut| { tokio::spawn(fut); })`
//! - Smol: `Spawner::new(|fut| smol::spawn(fut).detach())`
//! - No runtime: [`Spawner::threads`] (the default), one OS thread per task.

use std::sync::Arc;

use futures::future::BoxFuture;

/// Launches task futures.
#[derive(Clone)]
pub struct Spawner {
    spawn: Arc<dyn Fn(BoxFuture<'static, ()>) + Send + Sync>,
}

impl Spawner {
    pub fn new<S>(spawn: S) -> Self
    where
        S: Fn(BoxFuture<'static, ()>) + Send + Sync + 'static,
    {
        Self {
            spawn: Arc::new(spawn),
        }
    }

    /// Drive every task on a dedicated OS thread with `futures::executor::block_on`.
    ///
    /// If the thread cannot be created, the task future is dropped and the task finishes as
    /// aborted.
    pub fn threads() -> Self {
        Self::new(|fut| {
            let _ = std::thread::Builder::new()
                .name("taskgroup".into())
                .spawn(move || futures::executor::block_on(fut));
        })
    }

    pub(crate) fn spawn(&self, fut: BoxFuture<'static, ()>) {
        (self.spawn)(fut)
    }
}

impl Default for Spawner {
    fn default() -> Self {
        Self::threads()
    }
}

impl std::fmt::Debug for Spawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spawner").finish_non_exhaustive()
    }
}
