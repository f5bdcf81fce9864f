//! Composition helpers: express the shape of dependencies without new primitives.
//!
//! Each helper returns a fresh anonymous [`TaskFn`] that requests its inner functions from the
//! group of whatever task runs it, so the usual deduplication applies: any task in the group
//! runs at most once, no matter how many compositions mention it.

use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::warn;

use crate::group::Group;
use crate::key::TaskFn;
use crate::scope::Scope;
use crate::wait::MultiWait;

/// Serial: a task function that waits on the given tasks one after another, stopping at the
/// first error.
///
/// This only orders *this* function's waits. A task that already ran (or is running because
/// something else requested it) is not run again, so the actual execution order may differ
/// from the order given here. Nothing prevents another part of the graph from requesting the
/// same tasks through [`par`]; parallel wins.
pub fn ser<I>(funcs: I) -> TaskFn
where
    I: IntoIterator,
    I::Item: Into<TaskFn>,
{
    let funcs: Arc<[TaskFn]> = funcs.into_iter().map(Into::into).collect();

    TaskFn::labeled("ser", move |scope: Scope| {
        let funcs = Arc::clone(&funcs);
        async move {
            for func in funcs.iter() {
                scope.wait(func).await?;
            }
            Ok(())
        }
    })
}

/// Parallel (concurrent, strictly speaking): a task function that requests all given tasks at
/// once, then waits until they all succeed or any of them fails.
///
/// On failure it returns immediately; the other tasks keep running (see [`MultiWait`]).
pub fn par<I>(funcs: I) -> TaskFn
where
    I: IntoIterator,
    I::Item: Into<TaskFn>,
{
    let funcs: Arc<[TaskFn]> = funcs.into_iter().map(Into::into).collect();

    TaskFn::labeled("par", move |scope: Scope| {
        let funcs = Arc::clone(&funcs);
        async move {
            match &*funcs {
                [] => Ok(()),
                [func] => Ok(scope.wait(func).await?),
                funcs => {
                    let mut wait = MultiWait::new();
                    for func in funcs {
                        wait.add(&scope.task(func));
                    }
                    Ok(wait.wait().await?)
                }
            }
        }
    })
}

/// Optional: a task function that runs `func` and waits for it, but only logs its error.
///
/// The underlying task still records its real outcome; other dependents that wait on it
/// directly still see the failure.
///
/// ```no_run
/// use taskgroup::{opt, par, Group, Scope, TaskFn, TaskResult};
/// # async fn templates(_: Scope) -> TaskResult { Ok(()) }
/// # async fn styles(_: Scope) -> TaskResult { Ok(()) }
///
/// async fn build(scope: Scope) -> TaskResult {
///     let deps = par([TaskFn::new(templates), opt(TaskFn::new(styles))]);
///     scope.wait(&deps).await?;
///     Ok(())
/// }
/// ```
pub fn opt(func: impl Into<TaskFn>) -> TaskFn {
    let func = func.into();

    TaskFn::labeled("opt", move |scope: Scope| {
        let func = func.clone();
        async move {
            if let Err(err) = scope.wait(&func).await {
                #[cfg(feature = "tracing")]
                warn!(task = func.short_name(), "optional task failed");

                scope.log().log_error(&err);
            }
            Ok(())
        }
    })
}
