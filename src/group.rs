//! Task groups: the deduplicating registry and the only place tasks are created.
//!
//! Every task function requested from a group is identified by its [`TaskKey`]. The first
//! request creates a [`Task`] and launches it; every later request, from any thread, gets the
//! same task back, finished or not.
//!
//! Tasks form a graph, not a tree: they don't own each other, and a task may be awaited by any
//! number of dependents with different tolerance for its failure.

use std::collections::HashMap;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::{debug, error, info, trace};

use crate::context::Context;
use crate::error::TaskError;
use crate::key::{TaskFn, TaskKey};
use crate::log::LogSink;
use crate::scope::Scope;
use crate::spawn::Spawner;
use crate::task::Task;

/// Anything tasks can be requested from: a [`TaskGroup`], or the [`Scope`] of a running task.
pub trait Group {
    /// Find the task for `func` in the group, creating and launching it if there is none.
    fn task(&self, func: &TaskFn) -> Task;

    /// Find or start the task for `func`, then wait for it and return its outcome.
    ///
    /// Waiting on the calling task itself, directly or through other tasks, never completes.
    fn wait(&self, func: &TaskFn) -> impl Future<Output = Result<(), TaskError>> + Send + 'static {
        self.task(func).wait()
    }
}

/// Registry mapping task keys to tasks for one coordination session.
///
/// Cheap to clone; clones share the registry.
///
/// ```
/// use taskgroup::{Group, Scope, TaskFn, TaskGroup, TaskResult};
///
/// async fn styles(_: Scope) -> TaskResult {
///     Ok(())
/// }
///
/// let group = TaskGroup::new();
/// let first = group.task(&TaskFn::new(styles));
/// let second = group.task(&TaskFn::new(styles));
/// assert_eq!(first, second);
///
/// pollster::block_on(first.wait()).unwrap();
/// ```
#[derive(Clone)]
pub struct TaskGroup {
    inner: Arc<GroupInner>,
}

struct GroupInner {
    context: Context,
    spawner: Spawner,
    log: LogSink,
    // Held only across lookup-or-insert, never while a task runs
    tasks: Mutex<HashMap<TaskKey, Task>>,
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGroup {
    /// A group with a background context, one thread per task, and logging to stderr.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TaskGroupBuilder {
        TaskGroupBuilder::default()
    }

    /// The context handed to every task function in this group.
    pub fn context(&self) -> &Context {
        &self.inner.context
    }

    pub fn log(&self) -> &LogSink {
        &self.inner.log
    }

    /// Number of tasks created so far.
    pub fn len(&self) -> usize {
        self.inner.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.tasks.lock().is_empty()
    }

    /// Look up an existing task without creating one.
    pub fn get(&self, key: &TaskKey) -> Option<Task> {
        self.inner.tasks.lock().get(key).cloned()
    }
}

impl Group for TaskGroup {
    fn task(&self, func: &TaskFn) -> Task {
        let created = {
            let mut tasks = self.inner.tasks.lock();
            if let Some(existing) = tasks.get(func.key()) {
                #[cfg(feature = "tracing")]
                trace!(task = func.short_name(), "reusing existing task");

                return existing.clone();
            }

            // Stored before launch so that concurrent requests observe this task
            let created = Task::new(func.clone());
            tasks.insert(func.key().clone(), created.clone());
            created
        };

        #[cfg(feature = "tracing")]
        debug!(task = func.short_name(), key = ?func.key(), "launching task");

        let scope = Scope::new(self.inner.context.clone(), self.clone());
        let run = created.clone().run(scope).boxed();
        let spawned = panic::catch_unwind(AssertUnwindSafe(|| self.inner.spawner.spawn(run)));
        if spawned.is_err() {
            #[cfg(feature = "tracing")]
            error!(task = func.short_name(), "spawner panicked");

            created.abort();
        }
        created
    }
}

impl std::fmt::Debug for TaskGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGroup")
            .field("context", &self.inner.context)
            .field("tasks", &self.len())
            .finish()
    }
}

/// Configures and creates a [`TaskGroup`].
///
/// ```no_run
/// use taskgroup::{Context, Scope, TaskFn, TaskGroup, TaskResult};
///
/// async fn build(_: Scope) -> TaskResult {
///     Ok(())
/// }
///
/// # async {
/// TaskGroup::builder()
///     .context(Context::background())
///     .spawn_with(|fut| {
///         tokio::spawn(fut);
///     })
///     .run(&TaskFn::new(build))
///     .await
///     .unwrap();
/// # };
/// ```
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct TaskGroupBuilder {
    context: Option<Context>,
    spawner: Option<Spawner>,
    log: Option<LogSink>,
}

impl TaskGroupBuilder {
    /// Context handed to every task function. Defaults to [`Context::background`].
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// How tasks are launched. Defaults to [`Spawner::threads`].
    pub fn spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Shorthand for `.spawner(Spawner::new(spawn))`.
    pub fn spawn_with<S>(self, spawn: S) -> Self
    where
        S: Fn(BoxFuture<'static, ()>) + Send + Sync + 'static,
    {
        self.spawner(Spawner::new(spawn))
    }

    /// Where [`crate::opt`] and other side-channel reports go. Defaults to stderr.
    pub fn log_sink(mut self, log: LogSink) -> Self {
        self.log = Some(log);
        self
    }

    pub fn build(self) -> TaskGroup {
        TaskGroup {
            inner: Arc::new(GroupInner {
                context: self.context.unwrap_or_default(),
                spawner: self.spawner.unwrap_or_default(),
                log: self.log.unwrap_or_default(),
                tasks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Create the group and launch `root` as its first task.
    ///
    /// Honoring the context's cancellation is up to the task functions.
    pub fn start(self, root: &TaskFn) -> (TaskGroup, Task) {
        let group = self.build();
        let task = group.task(root);
        (group, task)
    }

    /// Create the group, run `root` to completion, and return its outcome.
    ///
    /// Tasks receive a child of the configured context, which is cancelled once `root`
    /// finishes (or this future is dropped). Tasks still running at that point keep running
    /// unless they honor the cancellation.
    pub async fn run(self, root: &TaskFn) -> Result<(), TaskError> {
        let (context, canceller) = self.context.clone().unwrap_or_default().with_cancel();
        let _cancel_on_exit = canceller.guard();

        #[cfg(feature = "tracing")]
        info!(root = root.short_name(), "starting task group");

        let (_group, task) = self.context(context).start(root);
        let result = task.wait().await;

        #[cfg(feature = "tracing")]
        {
            match &result {
                Ok(()) => info!(root = root.short_name(), "task group completed successfully"),
                Err(err) => error!(root = root.short_name(), error = %err, "task group failed"),
            }
        }

        result
    }
}
