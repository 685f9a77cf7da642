//! Debouncer: coalesces bursts of signals into one delayed action.
//!
//! A single flag means "a countdown is armed or the action is executing".
//! `signal()` arms the countdown only when the flag was clear, so at most one
//! invocation is pending or running at any time. Signals that arrive while the
//! action runs are dropped; the flag is cleared only after the action returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::PipelineError;

type Action = Box<dyn Fn() + Send + Sync>;

struct Inner {
    delay: Duration,
    action: Action,
    waiting_or_acting: AtomicBool,
}

impl Inner {
    fn fire(&self) {
        // Clears the flag even if the action panics.
        struct Clear<'a>(&'a AtomicBool);
        impl Drop for Clear<'_> {
            fn drop(&mut self) {
                self.0.store(false, Ordering::SeqCst);
            }
        }

        let _clear = Clear(&self.waiting_or_acting);
        (self.action)();
    }
}

/// Debounced action runner backed by the tokio timer.
pub struct Debouncer {
    inner: Arc<Inner>,
    runtime: Handle,
    timer: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl Debouncer {
    /// Create a debouncer that runs `action` once, `delay` after the first
    /// signal of a quiet period.
    ///
    /// Must be called from within a tokio runtime; the countdown is driven by
    /// that runtime, so `signal()` itself may be called from any thread.
    pub fn new<F>(delay: Duration, action: F) -> Result<Self, PipelineError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| PipelineError::NoRuntime)?;
        Ok(Self {
            inner: Arc::new(Inner {
                delay,
                action: Box::new(action),
                waiting_or_acting: AtomicBool::new(false),
            }),
            runtime,
            timer: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Arm the countdown unless it is already armed or the action is running.
    pub fn signal(&self) {
        if self.shut_down.load(Ordering::SeqCst) {
            return;
        }
        if self.inner.waiting_or_acting.swap(true, Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let countdown = self.runtime.spawn(async move {
            tokio::time::sleep(inner.delay).await;
            inner.fire();
        });

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        *timer = Some(countdown);
    }

    /// Whether a countdown is armed or the action is currently executing.
    pub fn is_pending(&self) -> bool {
        self.inner.waiting_or_acting.load(Ordering::SeqCst)
    }

    /// Release the timer.
    ///
    /// A pending countdown is cancelled; an action that is already executing
    /// runs to completion before this returns. Later signals are ignored.
    pub async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);

        let countdown = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(countdown) = countdown {
            countdown.abort();
            // Cancellation is only observed at the sleep; a running action completes first.
            let _ = countdown.await;
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(countdown) = self
            .timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            countdown.abort();
        }
    }
}
