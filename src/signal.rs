//! One-shot, level-triggered completion signal.
//!
//! A [`Signal`] fires once; every [`Done`] observing it resolves at that moment and keeps
//! resolving immediately on any later poll, like a closed channel.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;

pub(crate) struct Signal {
    fired: AtomicBool,
    sender: Mutex<Option<oneshot::Sender<()>>>,
    done: Done,
}

impl Signal {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            fired: AtomicBool::new(false),
            sender: Mutex::new(Some(sender)),
            done: Done {
                receiver: receiver.shared(),
            },
        }
    }

    /// Fire the signal. Returns `false` if it had already fired.
    pub(crate) fn fire(&self) -> bool {
        let Some(sender) = self.sender.lock().take() else {
            return false;
        };
        self.fired.store(true, Ordering::Release);
        // The receiver lives in `self.done`, so this cannot fail
        let _ = sender.send(());
        true
    }

    pub(crate) fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    pub(crate) fn done(&self) -> Done {
        self.done.clone()
    }
}

/// Future that resolves once a task (or context) is done.
///
/// Cheap to clone. Awaiting it after completion resolves immediately, any number of times.
#[derive(Clone)]
#[must_use = "futures do nothing unless awaited"]
pub struct Done {
    receiver: Shared<oneshot::Receiver<()>>,
}

impl Done {
    /// Non-blocking check: has the signal already fired?
    pub fn is_done(&self) -> bool {
        self.receiver.peek().is_some() || self.clone().now_or_never().is_some()
    }
}

impl Future for Done {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        // A dropped sender also means "done": nothing can fire it anymore
        self.receiver.poll_unpin(cx).map(|_| ())
    }
}

impl std::fmt::Debug for Done {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Done")
            .field("done", &self.is_done())
            .finish()
    }
}
