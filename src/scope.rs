//! The view of a group from inside a running task.

use std::future::Future;

use crate::context::{Cancelled, Context};
use crate::group::{Group, TaskGroup};
use crate::key::TaskFn;
use crate::log::LogSink;
use crate::task::Task;

/// What a task function receives: the group's cancellation [`Context`] and the [`TaskGroup`]
/// itself, so the function can request, start and wait on other tasks.
///
/// The context here is an ordinary cancellation context. It says nothing about this task's
/// own outcome; that is observed from the outside through the [`Task`] handle.
#[derive(Clone, Debug)]
pub struct Scope {
    context: Context,
    group: TaskGroup,
}

impl Scope {
    pub(crate) fn new(context: Context, group: TaskGroup) -> Self {
        Self { context, group }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn group(&self) -> &TaskGroup {
        &self.group
    }

    /// Side channel for reporting non-fatal errors and timings.
    pub fn log(&self) -> &LogSink {
        self.group.log()
    }

    pub fn is_cancelled(&self) -> bool {
        self.context.is_cancelled()
    }

    pub fn err(&self) -> Result<(), Cancelled> {
        self.context.err()
    }

    /// Resolves when the group's context is cancelled.
    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
        self.context.cancelled()
    }
}

impl Group for Scope {
    fn task(&self, func: &TaskFn) -> Task {
        self.group.task(func)
    }
}
