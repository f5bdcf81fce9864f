//! Deduplicating Task Groups
//!
//! Run a set of task functions as a single group with mutual coordination and deduplication.
//! Each task function takes a [`Scope`] of the running group and may request and wait on other
//! tasks in the same group. The group guarantees:
//!
//! - **Run at most once**: a task function runs at most once per group, however many tasks
//!   request it and however concurrently.
//! - **Shared waiting**: any number of tasks can wait on the same task without duplicating
//!   work; all of them observe the same outcome.
//! - **Observable outcome**: a [`Task`] exposes its completion ([`Task::done`]) and result
//!   ([`Task::result`]); panics become errors annotated with the task's name.
//! - **Composition**: [`ser`] (wait in order), [`par`] (fan out, fail fast) and [`opt`] (best
//!   effort) express the shape of dependencies.
//!
//! Good for build-script style orchestration, a small alternative to Make, and for any
//! application that wants to share expensive, at-most-once work between concurrent consumers.
//!
//! # Quick Start
//!
//! ```
//! use taskgroup::{par, Group, Scope, TaskFn, TaskGroup, TaskResult};
//!
//! async fn build(scope: Scope) -> TaskResult {
//!     // templates and styles run concurrently; styles runs once even though templates
//!     // waits on it too
//!     scope.wait(&par([TaskFn::new(templates), TaskFn::new(styles)])).await?;
//!     Ok(())
//! }
//!
//! async fn templates(scope: Scope) -> TaskResult {
//!     scope.wait(&TaskFn::new(styles)).await?;
//!     Ok(())
//! }
//!
//! async fn styles(_: Scope) -> TaskResult {
//!     Ok(())
//! }
//!
//! # pollster::block_on(async {
//! TaskGroup::builder().run(&TaskFn::new(build)).await.unwrap();
//! # });
//! ```
//!
//! # Core Concepts
//!
//! ## Task functions and identity
//!
//! A [`TaskFn`] wraps an `async` function (or closure) taking a [`Scope`] and returning a
//! [`TaskResult`]. Its [`TaskKey`] decides deduplication: all references to the same statically
//! defined function share a key, while closures and composed functions get a fresh key each
//! time they are created. [`TaskFn::named`] uses an explicit name instead.
//!
//! ## Inside and outside views
//!
//! A task function receives a [`Scope`]: the group's cancellation [`Context`] plus the
//! [`TaskGroup`]. The context behaves like any cancellation context, and whether the function
//! honors it is up to the function.
//!
//! Seen from the outside, as a [`Task`] returned by [`Group::task`], completion and result are
//! determined entirely by the function: [`Task::done`] resolves when it returns or panics, and
//! [`Task::result`] is what it returned. This is what lets other tasks coordinate on it.
//!
//! ## Graphs, not trees
//!
//! Tasks don't own each other. A failing dependency fails its direct waiters, but waiting
//! stops only for the waiter that gave up: `par` returns on the first error without touching
//! the other tasks, and `opt` logs the error of a task that other dependents may still require.
//!
//! ```text
//!   A            A -> par(B, C)
//!  / \           B -> D
//! B   C          C -> opt(D)
//!  \ /           D fails: D runs once, B fails, C succeeds, A fails with D's error via B
//!   D
//! ```
//!
//! # Runtime Agnostic
//!
//! Every task runs on its own independently scheduled thread of execution, provided by a
//! [`Spawner`]. The default runs each task on a dedicated OS thread; any async runtime works:
//!
//! ```ignore
//! // Tokio
//! TaskGroup::builder().spawn_with(|fut| { tokio::spawn(fut); })
//!
//! // smol
//! TaskGroup::builder().spawn_with(|fut| smol::spawn(fut).detach())
//! ```
//!
//! # Error Handling
//!
//! Task functions return [`TaskResult`] (`Result<(), BoxError>`), so `?` works on any error,
//! including the [`TaskError`] of a dependency. A failed task's error is permanent: there are no
//! retries. Errors keep every task name along the chain:
//!
//! ```text
//! task "A" finished with error: task "par#3" finished with error: task "B" finished with error: ...
//! ```
//!
//! A task function may also bail out with [`must`], which panics with the error as payload;
//! the group catches it and records [`TaskError::Panicked`] with the original error as its
//! source. Any other panic becomes [`TaskError::PanickedWithValue`]. A task whose run is dropped
//! before finishing (say, its runtime shut down) records [`TaskError::Aborted`], so waiters
//! never hang on it.
//!
//! Deadlocks are on the caller: a task that waits on itself, directly or transitively, never
//! finishes. There is no cycle detection.
//!
//! # Command Line
//!
//! [`choose`] and [`run_cmd`] select one task function by (case-insensitive) name, which is
//! enough for small build scripts:
//!
//! ```no_run
//! use taskgroup::{run_cmd_from_env, Scope, TaskFn, TaskGroup, TaskResult};
//! # async fn build(_: Scope) -> TaskResult { Ok(()) }
//! # async fn clean(_: Scope) -> TaskResult { Ok(()) }
//!
//! # async {
//! // cargo run -- build
//! run_cmd_from_env(TaskGroup::builder(), &[TaskFn::new(build), TaskFn::new(clean)])
//!     .await
//!     .unwrap();
//! # };
//! ```
//!
//! # Optional Tracing Support
//!
//! With the `tracing` feature, task creation, completion, panics and group runs are emitted as
//! `tracing` events. Without it, the instrumentation is compiled out:
//!
//! ```toml
//! [dependencies]
//! taskgroup = { version = "0.1", features = ["tracing"] }
//! ```
//!
//! - **INFO**: group run start/completion, timings
//! - **DEBUG**: task launches, task failures
//! - **TRACE**: dedup hits, task completion
//! - **WARN**: failures swallowed by [`opt`]
//! - **ERROR**: task panics, failed group runs
//!
//! Regardless of the feature, [`opt`] and [`LogSink`] write plain-text reports to the group's
//! sink (stderr by default).

mod compose;
mod context;
mod error;
mod group;
mod key;
mod log;
mod scope;
mod select;
mod signal;
mod spawn;
mod task;
mod wait;

pub use compose::{opt, par, ser};
pub use context::{CancelGuard, Cancelled, Canceller, Context};
pub use error::{BoxError, Error, SelectError, TaskError, TaskResult};
pub use group::{Group, TaskGroup, TaskGroupBuilder};
pub use key::{TaskFn, TaskKey};
pub use log::{LogSink, Timing};
pub use scope::Scope;
pub use select::{choose, run_cmd, run_cmd_from_env};
pub use signal::Done;
pub use spawn::Spawner;
pub use task::Task;
pub use wait::MultiWait;

/// Unwrap a result inside a task function, panicking with the error otherwise.
///
/// The group catches the panic and records it as [`TaskError::Panicked`] with the error as
/// source, so this keeps control flow explicit without losing the cause. A plain `panic!` or a
/// `panic_any` with some other value only keeps a message, apart from a few common error types
/// (`io::Error`, [`Cancelled`], [`TaskError`], ...):
///
/// ```no_run
/// use taskgroup::{must, Group, Scope, TaskFn, TaskResult};
/// # async fn styles(_: Scope) -> TaskResult { Ok(()) }
///
/// async fn templates(scope: Scope) -> TaskResult {
///     must(scope.wait(&TaskFn::new(styles)).await);
///     Ok(())
/// }
/// ```
#[track_caller]
pub fn must<T, E: Into<BoxError>>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => std::panic::panic_any(err.into()),
    }
}
