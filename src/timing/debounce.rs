//! Debounce: collapse a burst of calls into one invocation.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::invocation::{ActionCell, Invocation};
use super::timer::{PendingTimer, Timer, TokioTimer};
use crate::error::Result;

/// Wrap `action` so a burst of calls runs it once.
///
/// With `invoke_immediately == false` the action runs `wait` after the last
/// call of a burst, with that call's arguments. With `invoke_immediately ==
/// true` it runs synchronously on the first call of a burst instead, and the
/// burst ends once `wait` passes without calls.
///
/// Requires a tokio runtime; see [`Debounce::new`] for other timers.
pub fn debounce<A, R, F>(
    mut action: F,
    wait: Duration,
    invoke_immediately: bool,
) -> Result<Debounce<A, R>>
where
    A: Send + 'static,
    R: Send + 'static,
    F: FnMut(A) -> R + Send + 'static,
{
    let timer = TokioTimer::new()?;
    Ok(Debounce::new(
        timer,
        wait,
        invoke_immediately,
        move |invocation: Invocation<A>| action(invocation.args),
    ))
}

/// A debounced trigger. Cloning shares the same timer state.
pub struct Debounce<A, R, C = (), T: Timer = TokioTimer> {
    inner: Arc<Inner<A, R, C, T>>,
}

struct Inner<A, R, C, T: Timer> {
    timer: T,
    wait: Duration,
    immediate: bool,
    action: ActionCell<A, C, R>,
    state: Mutex<DebounceState<A, R, C, T::Handle>>,
}

struct DebounceState<A, R, C, H> {
    pending: Option<PendingTimer<H>>,
    next_timer_id: u64,
    last_call: Option<Instant>,
    saved: Option<Invocation<A, C>>,
    result: Option<R>,
}

impl<A, R, C, T> Debounce<A, R, C, T>
where
    A: Send + 'static,
    R: Send + 'static,
    C: Send + 'static,
    T: Timer,
{
    /// Create a debounced trigger on an explicit timer facility.
    pub fn new<F>(timer: T, wait: Duration, invoke_immediately: bool, action: F) -> Self
    where
        F: FnMut(Invocation<A, C>) -> R + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                timer,
                wait,
                immediate: invoke_immediately,
                action: ActionCell::new(action),
                state: Mutex::new(DebounceState {
                    pending: None,
                    next_timer_id: 0,
                    last_call: None,
                    saved: None,
                    result: None,
                }),
            }),
        }
    }

    /// Trigger with an explicit calling context.
    ///
    /// Returns the result of the most recent invocation, which may belong to
    /// an earlier burst.
    pub fn call_with(&self, context: C, args: A) -> Option<R>
    where
        R: Clone,
    {
        let inner = &self.inner;
        let due = {
            let mut state = inner.state.lock();
            state.saved = Some(Invocation::new(args, context));
            state.last_call = Some(inner.timer.now());

            let call_now = inner.immediate && state.pending.is_none();
            if state.pending.is_none() {
                Inner::arm(inner, &mut state, inner.wait);
            }

            if call_now {
                state.saved.take()
            } else {
                None
            }
        };

        if let Some(invocation) = due {
            debug!("Debounce leading invocation");
            inner.invoke(invocation);
        }

        inner.state.lock().result.clone()
    }

    /// Trigger with the default context.
    pub fn call(&self, args: A) -> Option<R>
    where
        C: Default,
        R: Clone,
    {
        self.call_with(C::default(), args)
    }

    /// Whether a cooldown/trailing timer is currently armed.
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }
}

impl<A, R, C, T> Inner<A, R, C, T>
where
    A: Send + 'static,
    R: Send + 'static,
    C: Send + 'static,
    T: Timer,
{
    fn arm(this: &Arc<Self>, state: &mut DebounceState<A, R, C, T::Handle>, delay: Duration) {
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

            let elapsed = state
                .last_call
                .map(|at| this.timer.now().saturating_duration_since(at))
                .unwrap_or(this.wait);

            if elapsed < this.wait {
                trace!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Debounce called again during wait, re-arming"
                );
                Inner::arm(this, &mut state, this.wait - elapsed);
                return;
            }

            state.pending = None;
            if this.immediate {
                // The cooldown is over and the leading call already ran
                state.saved = None;
                None
            } else {
                state.saved.take()
            }
        };

        if let Some(invocation) = due {
            debug!("Debounce trailing invocation");
            this.invoke(invocation);
        }
    }

    fn invoke(&self, invocation: Invocation<A, C>) {
        self.action
            .run(invocation, |result| self.state.lock().result = Some(result));
    }
}

impl<A, R, C, T: Timer> Clone for Debounce<A, R, C, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
