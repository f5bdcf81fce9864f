//! Task functions and their identity.
//!
//! A [`TaskFn`] pairs a type-erased task function with a [`TaskKey`] used for deduplication
//! and a short name used for diagnostics and command-line selection.
//!
//! # Identity
//!
//! - [`TaskFn::new`] with a statically defined function derives the key from the function's
//!   type. Every fn item has its own zero-sized type, so all references to the same function
//!   share a key:
//!
//! ```
//! use taskgroup::{Scope, TaskFn, TaskResult};
//!
//! async fn styles(_: Scope) -> TaskResult {
//!     Ok(())
//! }
//!
//! assert_eq!(TaskFn::new(styles).key(), TaskFn::new(styles).key());
//! assert_eq!(TaskFn::new(styles).short_name(), "styles");
//! ```
//!
//! - [`TaskFn::new`] with a closure, a fn pointer or a boxed `dyn Fn`, [`TaskFn::anonymous`],
//!   and the composition helpers produce a fresh anonymous key each time, so two closures
//!   never collide even when they behave the same. Clones of one `TaskFn` keep its key.
//! - [`TaskFn::named`] uses a caller-provided name as the key. Two `named` functions with the
//!   same name are the same task as far as a group is concerned.

use std::any::TypeId;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::TaskResult;
use crate::scope::Scope;

static NEXT_ANONYMOUS: AtomicU64 = AtomicU64::new(1);

type ErasedTaskFn = dyn Fn(Scope) -> BoxFuture<'static, TaskResult> + Send + Sync;

/// Identity of a task function within a group. Compared, hashed, never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// A statically defined function, identified by its type.
    Fn(TypeId),
    /// An explicit, caller-provided name.
    Named(Arc<str>),
    /// A closure or composed function; unique per construction.
    Anonymous(u64),
}

/// A task function: takes the task's [`Scope`] and returns a [`TaskResult`].
///
/// Task functions are invoked by a [`crate::TaskGroup`], never called directly; the group makes
/// sure each one runs at most once.
#[derive(Clone)]
pub struct TaskFn {
    key: TaskKey,
    name: Arc<str>,
    func: Arc<ErasedTaskFn>,
}

impl TaskFn {
    /// Wrap a function, deriving its identity and short name from its type.
    ///
    /// Statically defined functions get a stable key and their own name. Closures get a fresh
    /// anonymous key and cannot be selected by name, and so do fn pointers and boxed `dyn Fn`:
    /// their type is shared by every function they may point to.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Scope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        let type_name = std::any::type_name::<F>();
        if type_name.contains("{{closure}}") {
            return Self::labeled("closure", func);
        }
        // Only fn items are zero-sized and unique to one function
        if std::mem::size_of::<F>() != 0 {
            return Self::labeled("anonymous", func);
        }

        Self {
            key: TaskKey::Fn(TypeId::of::<F>()),
            name: Arc::from(short_name(type_name)),
            func: erase(func),
        }
    }

    /// Wrap a function under an explicit name, which is also its key.
    pub fn named<F, Fut>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(Scope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        let name = name.into();
        Self {
            key: TaskKey::Named(Arc::clone(&name)),
            name,
            func: erase(func),
        }
    }

    /// Wrap a function under a fresh anonymous key.
    pub fn anonymous<F, Fut>(func: F) -> Self
    where
        F: Fn(Scope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        Self::labeled("anonymous", func)
    }

    pub(crate) fn labeled<F, Fut>(label: &'static str, func: F) -> Self
    where
        F: Fn(Scope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        let id = NEXT_ANONYMOUS.fetch_add(1, Ordering::Relaxed);
        Self {
            key: TaskKey::Anonymous(id),
            name: Arc::from(format!("{label}#{id}")),
            func: erase(func),
        }
    }

    pub fn key(&self) -> &TaskKey {
        &self.key
    }

    /// Name without the module path: `"styles"` for `my_build::tasks::styles`.
    ///
    /// Anonymous functions get a diagnostic label such as `"par#7"`.
    pub fn short_name(&self) -> &str {
        &self.name
    }

    /// Whether this function has a name usable for selection.
    pub fn is_named(&self) -> bool {
        !matches!(self.key, TaskKey::Anonymous(_)) && !self.name.is_empty()
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub(crate) fn call(&self, scope: Scope) -> BoxFuture<'static, TaskResult> {
        (self.func)(scope)
    }
}

impl From<&TaskFn> for TaskFn {
    fn from(func: &TaskFn) -> Self {
        func.clone()
    }
}

impl std::fmt::Debug for TaskFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFn")
            .field("key", &self.key)
            .field("name", &self.name)
            .finish()
    }
}

fn erase<F, Fut>(func: F) -> Arc<ErasedTaskFn>
where
    F: Fn(Scope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TaskResult> + Send + 'static,
{
    Arc::new(move |scope| func(scope).boxed())
}

fn short_name(type_name: &str) -> &str {
    let path = type_name.split('<').next().unwrap_or(type_name);
    path.rsplit("::").next().unwrap_or(path)
}
