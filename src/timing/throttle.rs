//! Throttle: run an action at most once per wait window.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::invocation::{ActionCell, Invocation};
use super::timer::{PendingTimer, Timer, TokioTimer};
use crate::error::Result;

/// Edge behaviour of a throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleOptions {
    /// Invoke on the first call of an idle period
    #[serde(default = "default_true")]
    pub leading: bool,
    /// Invoke once more at the end of a window with the latest call
    #[serde(default = "default_true")]
    pub trailing: bool,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            leading: true,
            trailing: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Wrap `action` so it runs at most once every `wait`.
///
/// When `bound_context` is set, every invocation uses it instead of the
/// context passed to [`Throttle::call_with`].
///
/// Requires a tokio runtime; see [`Throttle::new`] for other timers.
pub fn throttle<A, R, C, F>(
    action: F,
    wait: Duration,
    options: ThrottleOptions,
    bound_context: Option<C>,
) -> Result<Throttle<A, R, C>>
where
    A: Send + 'static,
    R: Send + 'static,
    C: Clone + Send + Sync + 'static,
    F: FnMut(Invocation<A, C>) -> R + Send + 'static,
{
    let timer = TokioTimer::new()?;
    Ok(Throttle::new(timer, wait, options, bound_context, action))
}

/// A throttled trigger. Cloning shares the same timer state.
pub struct Throttle<A, R, C = (), T: Timer = TokioTimer> {
    inner: Arc<Inner<A, R, C, T>>,
}

struct Inner<A, R, C, T: Timer> {
    timer: T,
    wait: Duration,
    options: ThrottleOptions,
    bound_context: Option<C>,
    action: ActionCell<A, C, R>,
    state: Mutex<ThrottleState<A, R, C, T::Handle>>,
}

struct ThrottleState<A, R, C, H> {
    pending: Option<PendingTimer<H>>,
    next_timer_id: u64,
    /// Start of the current window; `None` means idle.
    previous: Option<Instant>,
    saved: Option<Invocation<A, C>>,
    result: Option<R>,
}

impl<A, R, C, T> Throttle<A, R, C, T>
where
    A: Send + 'static,
    R: Send + 'static,
    C: Clone + Send + Sync + 'static,
    T: Timer,
{
    /// Create a throttled trigger on an explicit timer facility.
    pub fn new<F>(
        timer: T,
        wait: Duration,
        options: ThrottleOptions,
        bound_context: Option<C>,
        action: F,
    ) -> Self
    where
        F: FnMut(Invocation<A, C>) -> R + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                timer,
                wait,
                options,
                bound_context,
                action: ActionCell::new(action),
                state: Mutex::new(ThrottleState {
                    pending: None,
                    next_timer_id: 0,
                    previous: None,
                    saved: None,
                    result: None,
                }),
            }),
        }
    }

    /// Trigger with an explicit calling context.
    ///
    /// Returns the result of the most recent invocation.
    pub fn call_with(&self, context: C, args: A) -> Option<R>
    where
        R: Clone,
    {
        let inner = &self.inner;
        let due = {
            let mut state = inner.state.lock();
            let now = inner.timer.now();

            if state.previous.is_none() && !inner.options.leading {
                state.previous = Some(now);
            }

            let context = match &inner.bound_context {
                Some(bound) => bound.clone(),
                None => context,
            };
            state.saved = Some(Invocation::new(args, context));

            // tokio's clock is monotonic, so `now` never precedes `previous`
            let elapsed = state
                .previous
                .map(|previous| now.saturating_duration_since(previous));

            match elapsed {
                Some(elapsed) if elapsed < inner.wait => {
                    if state.pending.is_none() && inner.options.trailing {
                        let remaining = inner.wait - elapsed;
                        trace!(
                            remaining_ms = remaining.as_millis() as u64,
                            "Throttle scheduling trailing invocation"
                        );
                        Inner::arm(inner, &mut state, remaining);
                    }
                    None
                }
                _ => {
                    if let Some(pending) = state.pending.take() {
                        inner.timer.clear_timer(pending.handle);
                    }
                    state.previous = Some(now);
                    state.saved.take()
                }
            }
        };

        if let Some(invocation) = due {
            debug!("Throttle immediate invocation");
            inner.invoke(invocation);
        }

        inner.state.lock().result.clone()
    }

    /// Trigger with the default context (or the bound one).
    pub fn call(&self, args: A) -> Option<R>
    where
        C: Default,
        R: Clone,
    {
        self.call_with(C::default(), args)
    }

    /// Whether a trailing invocation is scheduled.
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }
}

impl<A, R, C, T> Inner<A, R, C, T>
where
    A: Send + 'static,
    R: Send + 'static,
    C: Clone + Send + Sync + 'static,
    T: Timer,
{
    fn arm(this: &Arc<Self>, state: &mut ThrottleState<A, R, C, T::Handle>, delay: Duration) {
        state.next_timer_id += 1;
        let id = state.next_timer_id;
        let owner = Arc::clone(this);
        let handle = this
            .timer
            .set_timer(delay, Box::new(move || Inner::fire(&owner, id)));
        state.pending = Some(PendingTimer { id, handle });
    }

    fn fire(this: &Arc<Self>, id: u64) {
        let due = {
            let mut state = this.state.lock();
            if state.pending.as_ref().map(|p| p.id) != Some(id) {
                return;
            }

            state.previous = if this.options.leading {
                Some(this.timer.now())
            } else {
                None
            };
            state.pending = None;
            state.saved.take()
        };

        if let Some(invocation) = due {
            debug!("Throttle trailing invocation");
            this.invoke(invocation);
        }
    }

    fn invoke(&self, invocation: Invocation<A, C>) {
        self.action
            .run(invocation, |result| self.state.lock().result = Some(result));
    }
}

impl<A, R, C, T: Timer> Clone for Throttle<A, R, C, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
