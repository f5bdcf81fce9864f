//! Error types for task groups.
//!
//! [`TaskError`] is what waiters observe when a task fails or panics. It is cheap to clone so
//! every current and future waiter of a task sees the same error. [`SelectError`] covers the
//! command-line selection surface, and [`Error`] joins both for [`crate::run_cmd`].

use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;

/// Boxed error returned by task functions.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type returned by task functions.
pub type TaskResult = Result<(), BoxError>;

type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Errors recorded by a task when its function fails or panics.
///
/// The task's short name is kept in every variant, and the original error (if any) is reachable
/// through [`std::error::Error::source`], so a chain like `A -> B -> D` reads:
///
/// ```text
/// task "A" finished with error: task "B" finished with error: task "D" finished with error: arbitrary failure
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum TaskError {
    /// The task function returned an error.
    Failed { task: Arc<str>, source: SharedError },
    /// The task function panicked with an error payload (see [`crate::must`]).
    Panicked { task: Arc<str>, source: SharedError },
    /// The task function panicked with a non-error payload.
    PanickedWithValue { task: Arc<str>, payload: String },
    /// The task's run was dropped before the function finished, for example because the
    /// runtime shut down or the spawner discarded it.
    Aborted { task: Arc<str> },
}

impl TaskError {
    pub(crate) fn failed(task: Arc<str>, source: BoxError) -> Self {
        TaskError::Failed {
            task,
            source: Arc::from(source),
        }
    }

    /// Translate a panic payload caught at the boundary of a task's execution.
    ///
    /// Boxed errors (as raised by [`crate::must`]) and a few common concrete error types keep
    /// their cause. Other payloads are reduced to a message.
    pub(crate) fn from_panic(task: Arc<str>, payload: Box<dyn Any + Send>) -> Self {
        let payload = match panic_source(payload) {
            Ok(source) => return TaskError::Panicked { task, source },
            Err(payload) => payload,
        };

        let payload = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        TaskError::PanickedWithValue { task, payload }
    }

    /// Short name of the task that recorded this error.
    pub fn task_name(&self) -> &str {
        match self {
            TaskError::Failed { task, .. }
            | TaskError::Panicked { task, .. }
            | TaskError::PanickedWithValue { task, .. }
            | TaskError::Aborted { task } => task,
        }
    }

    /// Whether the task terminated by panicking instead of returning.
    pub fn is_panic(&self) -> bool {
        matches!(
            self,
            TaskError::Panicked { .. } | TaskError::PanickedWithValue { .. }
        )
    }

    /// Find the first error of type `E` in the chain, starting with `self`.
    pub fn find<E: StdError + 'static>(&self) -> Option<&E> {
        let mut current: Option<&(dyn StdError + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(found) = err.downcast_ref::<E>() {
                return Some(found);
            }
            current = err.source();
        }
        None
    }

    /// Whether the chain bottoms out in a cancellation of the group's context.
    pub fn is_cancelled(&self) -> bool {
        self.find::<crate::context::Cancelled>().is_some()
    }
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::Failed { task, source } => {
                write!(f, "task {:?} finished with error: {}", task, source)
            }
            TaskError::Panicked { task, source } => {
                write!(f, "task {:?} panicked with error: {}", task, source)
            }
            TaskError::PanickedWithValue { task, payload } => {
                write!(f, "task {:?} panicked with non-error value {:?}", task, payload)
            }
            TaskError::Aborted { task } => {
                write!(f, "task {:?} was dropped before finishing", task)
            }
        }
    }
}

impl StdError for TaskError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TaskError::Failed { source, .. } | TaskError::Panicked { source, .. } => {
                Some(&**source)
            }
            TaskError::PanickedWithValue { .. } | TaskError::Aborted { .. } => None,
        }
    }
}

/// Recover an error from a panic payload, or hand the payload back.
fn panic_source(payload: Box<dyn Any + Send>) -> Result<SharedError, Box<dyn Any + Send>> {
    macro_rules! downcast_errors {
        ($payload:expr, $($ty:ty),+ $(,)?) => {{
            let payload = $payload;
            $(
                let payload = match payload.downcast::<$ty>() {
                    Ok(err) => return Ok(Arc::new(*err) as SharedError),
                    Err(payload) => payload,
                };
            )+
            payload
        }};
    }

    let payload = match payload.downcast::<BoxError>() {
        Ok(err) => return Ok(Arc::from(*err)),
        Err(payload) => payload,
    };

    Err(downcast_errors!(
        payload,
        TaskError,
        Error,
        SelectError,
        crate::context::Cancelled,
        std::io::Error,
        std::fmt::Error,
    ))
}

/// Errors from resolving task names against a set of task functions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SelectError {
    #[error("unexpected unnamed task function {label:?}")]
    Unnamed { label: String },

    #[error("unexpected task function with duplicate name {name:?}")]
    DuplicateName { name: String },

    #[error("unexpected duplicate task function {name:?}")]
    DuplicateTask { name: String },

    #[error("unknown task {name:?}; known tasks (case-insensitive): {known:?}")]
    UnknownTask { name: String, known: Vec<String> },

    #[error("no task specified, please choose one; known tasks (case-insensitive): {known:?}")]
    NoTaskSelected { known: Vec<String> },

    #[error("too many tasks specified, please choose one (case-insensitive): {chosen:?}")]
    TooManyTasks { chosen: Vec<String> },
}

/// Errors from running a task selected on the command line.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Task(#[from] TaskError),
}
