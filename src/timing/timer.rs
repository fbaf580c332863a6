//! Host timer facility.
//!
//! The rate limiters and the animation-frame shim only need a clock and a
//! one-shot "call me later" primitive. [`Timer`] abstracts over that so the
//! tokio-backed default can be swapped for another host.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::trace;

use crate::error::Result;

/// Callback run once when a timer fires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// A one-shot timer facility (`setTimeout` / `clearTimeout`).
///
/// Implementations must not run the callback synchronously inside
/// `set_timer`; callers may hold locks across that call.
pub trait Timer: Send + Sync + 'static {
    /// Handle identifying a scheduled callback.
    type Handle: Send + 'static;

    /// Current time on the facility's clock.
    fn now(&self) -> Instant;

    /// Run `callback` once, no earlier than `delay` from now.
    fn set_timer(&self, delay: Duration, callback: TimerCallback) -> Self::Handle;

    /// Cancel a scheduled callback. Clearing a timer that already fired is a no-op.
    fn clear_timer(&self, handle: Self::Handle);
}

/// Timer backed by tokio tasks: each timer is a task that sleeps, then runs
/// the callback. Clearing aborts the task.
#[derive(Debug, Clone)]
pub struct TokioTimer {
    runtime: Handle,
}

impl TokioTimer {
    /// Create a timer bound to the current tokio runtime.
    pub fn new() -> Result<Self> {
        Ok(Self {
            runtime: Handle::try_current()?,
        })
    }

    /// Create a timer bound to a specific runtime.
    pub fn from_handle(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Timer for TokioTimer {
    type Handle = AbortHandle;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn set_timer(&self, delay: Duration, callback: TimerCallback) -> AbortHandle {
        trace!(delay_ms = delay.as_millis() as u64, "Arming timer");
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        task.abort_handle()
    }

    fn clear_timer(&self, handle: AbortHandle) {
        trace!("Clearing timer");
        handle.abort();
    }
}

/// A timer that is currently armed, tagged so a stale callback can tell it
/// has been superseded.
#[derive(Debug)]
pub(crate) struct PendingTimer<H> {
    pub id: u64,
    pub handle: H,
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_new_outside_runtime_fails() {
        assert!(TokioTimer::new().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let timer = TokioTimer::new().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        timer.set_timer(
            Duration::from_millis(50),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(49)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_timer_never_fires() {
        let timer = TokioTimer::new().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let handle = timer.set_timer(
            Duration::from_millis(50),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        timer.clear_timer(handle);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
