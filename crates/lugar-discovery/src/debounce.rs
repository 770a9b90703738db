//! Trailing debounce timer.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs at most one pending action; scheduling a new one aborts the previous
/// one, whether it is still waiting out the delay or already running.
///
/// Must be used from within a tokio runtime. Dropping the debouncer aborts
/// the pending action.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// `true` while an action is waiting or running.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Aborts the pending action. Returns `true` if one was still live.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Replaces the pending action with `action`, run once the configured
    /// delay has elapsed without another call.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.schedule_after(self.delay, action);
    }

    /// Replaces the pending action with `action`, run immediately.
    pub fn schedule_now<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.schedule_after(Duration::ZERO, action);
    }

    fn schedule_after<F>(&mut self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            action.await;
        }));
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
