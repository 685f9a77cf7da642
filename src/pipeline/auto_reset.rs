//! Single-slot asynchronous signal with auto-reset semantics.
//!
//! The event is always in exactly one of three states:
//!
//! - **Idle**: no signal pending, nobody waiting
//! - **Signaled**: a signal is pending and will be consumed by the next `wait()`
//! - **Waiting**: one logical wait is outstanding; every `wait()` call made in
//!   this state receives a clone of the same [`Wait`]
//!
//! All transitions happen under one mutex that is only held for the state swap.

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

/// A pending or completed wait on an [`AutoResetEvent`].
///
/// Clones refer to the same underlying wait; use [`Wait::same_wait`] to compare identity.
#[derive(Clone)]
pub struct Wait {
    inner: Shared<oneshot::Receiver<()>>,
}

impl Wait {
    fn pending() -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { inner: rx.shared() }, tx)
    }

    fn completed() -> Self {
        let (wait, tx) = Self::pending();
        // The receiver is alive inside `wait`, so the send cannot fail.
        let _ = tx.send(());
        wait
    }

    /// Whether this wait has already been released.
    pub fn is_complete(&self) -> bool {
        self.inner.clone().now_or_never().is_some()
    }

    /// Whether `self` and `other` are the same logical wait.
    pub fn same_wait(&self, other: &Wait) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl Future for Wait {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        // A dropped sender only happens when the event itself is dropped; treat it as released.
        Pin::new(&mut self.inner).poll(cx).map(|_| ())
    }
}

impl std::fmt::Debug for Wait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wait")
            .field("complete", &self.is_complete())
            .finish()
    }
}

enum State {
    Idle,
    Signaled,
    Waiting {
        wait: Wait,
        release: oneshot::Sender<()>,
    },
}

/// Asynchronous auto-reset event.
///
/// A `set()` with nobody waiting is remembered until exactly one `wait()`
/// consumes it. Redundant `set()` calls before consumption coalesce into one.
pub struct AutoResetEvent {
    state: Mutex<State>,
}

impl AutoResetEvent {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Idle),
        }
    }

    /// Signal the event.
    ///
    /// Releases the outstanding wait if there is one, otherwise leaves the
    /// event signaled for the next `wait()`.
    pub fn set(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *state, State::Idle) {
            State::Idle | State::Signaled => *state = State::Signaled,
            State::Waiting { release, .. } => {
                // Every holder of the wait observes completion through the shared receiver.
                let _ = release.send(());
            }
        }
    }

    /// Obtain the wait for the next signal.
    ///
    /// Consumes a pending signal immediately (returning a completed wait);
    /// otherwise returns the shared outstanding wait, creating it if needed.
    pub fn wait(&self) -> Wait {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            State::Signaled => {
                *state = State::Idle;
                Wait::completed()
            }
            State::Waiting { wait, .. } => wait.clone(),
            State::Idle => {
                let (wait, release) = Wait::pending();
                *state = State::Waiting {
                    wait: wait.clone(),
                    release,
                };
                wait
            }
        }
    }
}

impl Default for AutoResetEvent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_is_initially_not_signaled() {
        let event = AutoResetEvent::new();
        assert!(!event.wait().is_complete());
    }

    #[test]
    fn test_signal_before_wait_is_remembered() {
        let event = AutoResetEvent::new();
        event.set();
        assert!(event.wait().is_complete());
    }

    #[test]
    fn test_signal_after_wait_releases_it() {
        let event = AutoResetEvent::new();
        let wait = event.wait();
        event.set();
        assert!(wait.is_complete());
    }

    #[test]
    fn test_resets_after_releasing_outstanding_wait() {
        let event = AutoResetEvent::new();
        let _first = event.wait();
        event.set();
        assert!(!event.wait().is_complete());
    }

    #[test]
    fn test_resets_after_consuming_pending_signal() {
        let event = AutoResetEvent::new();
        event.set();
        let _consumed = event.wait();
        assert!(!event.wait().is_complete());
    }

    #[test]
    fn test_repeated_set_signals_only_one_wait() {
        let event = AutoResetEvent::new();
        event.set();
        event.set();
        assert!(event.wait().is_complete());
        assert!(!event.wait().is_complete());
    }

    #[test]
    fn test_concurrent_waits_share_one_wait() {
        let event = AutoResetEvent::new();
        let a = event.wait();
        let b = event.wait();
        assert!(a.same_wait(&b));

        event.set();
        assert!(a.is_complete() && b.is_complete());

        let c = event.wait();
        let d = event.wait();
        assert!(c.same_wait(&d));
        assert!(!c.same_wait(&a));
    }

    #[test]
    fn test_immediate_completions_never_exceed_sets() {
        // Interleave sets and waits; each completed wait must be paid for by a set.
        let event = AutoResetEvent::new();
        let script = [true, true, false, false, true, false, false, true, true, true, false];
        let mut sets = 0;
        let mut immediate = 0;
        for is_set in script {
            if is_set {
                event.set();
                sets += 1;
            } else if event.wait().is_complete() {
                immediate += 1;
            }
            assert!(immediate <= sets);
        }
    }

    #[tokio::test]
    async fn test_awaiting_wait_resumes_after_set() {
        let event = std::sync::Arc::new(AutoResetEvent::new());
        let wait = event.wait();

        let setter = {
            let event = event.clone();
            tokio::spawn(async move { event.set() })
        };

        wait.await;
        setter.await.unwrap();
        assert!(!event.wait().is_complete());
    }
}
