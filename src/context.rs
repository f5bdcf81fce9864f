//! Cancellation context shared by the tasks of a group.
//!
//! A [`Context`] only observes cancellation; the ability to cancel lives in the [`Canceller`]
//! returned alongside a derived context. Cancelling a context cancels every context derived
//! from it, never its parent.
//!
//! Honoring cancellation is up to each task function. The group never aborts a running task.

use std::future::Future;
use std::sync::Arc;

use crate::signal::{Done, Signal};

/// Error returned by [`Context::err`] once the context is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("context canceled")]
pub struct Cancelled;

/// Observe-only cancellation handle. Cheap to clone.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    signal: Signal,
    parent: Option<Context>,
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl Context {
    /// A context that is never cancelled.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(ContextInner {
                signal: Signal::new(),
                parent: None,
            }),
        }
    }

    /// Derive a child context together with the handle that cancels it.
    ///
    /// ```
    /// use taskgroup::Context;
    ///
    /// let root = Context::background();
    /// let (child, canceller) = root.with_cancel();
    ///
    /// canceller.cancel();
    /// assert!(child.is_cancelled());
    /// assert!(!root.is_cancelled());
    /// ```
    pub fn with_cancel(&self) -> (Context, Canceller) {
        let inner = Arc::new(ContextInner {
            signal: Signal::new(),
            parent: Some(self.clone()),
        });
        let canceller = Canceller {
            inner: Arc::clone(&inner),
        };
        (Context { inner }, canceller)
    }

    /// Whether this context or any of its ancestors has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.lineage().any(|ctx| ctx.inner.signal.is_fired())
    }

    /// `Err(Cancelled)` once cancelled, `Ok(())` before.
    pub fn err(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves when this context or any of its ancestors is cancelled.
    ///
    /// Never resolves for [`Context::background`].
    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
        let signals: Vec<Done> = self.lineage().map(|ctx| ctx.inner.signal.done()).collect();
        // Dropping the last handle would drop the senders and resolve the signals
        let keep_alive = self.clone();
        async move {
            futures::future::select_all(signals).await;
            drop(keep_alive);
        }
    }

    fn lineage(&self) -> impl Iterator<Item = &Context> {
        std::iter::successors(Some(self), |ctx| ctx.inner.parent.as_ref())
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Cancels the context it was created with (see [`Context::with_cancel`]).
#[derive(Clone)]
pub struct Canceller {
    inner: Arc<ContextInner>,
}

impl Canceller {
    /// Cancel the context. Idempotent.
    pub fn cancel(&self) {
        self.inner.signal.fire();
    }

    /// Cancel the context when the returned guard is dropped.
    pub fn guard(self) -> CancelGuard {
        CancelGuard { canceller: self }
    }
}

impl std::fmt::Debug for Canceller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canceller")
            .field("cancelled", &self.inner.signal.is_fired())
            .finish()
    }
}

/// Cancels its context on drop, even on early return or panic.
#[derive(Debug)]
pub struct CancelGuard {
    canceller: Canceller,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.canceller.cancel();
    }
}
