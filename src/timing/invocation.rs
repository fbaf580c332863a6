//! Captured invocation passed to rate-limited actions.

use parking_lot::Mutex;
use std::thread::{self, ThreadId};
use tracing::trace;

/// The arguments and calling context of one trigger call.
///
/// Rate limiters keep only the most recent one; each call replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<A, C = ()> {
    /// Arguments of the call
    pub args: A,
    /// Context the action should run with
    pub context: C,
}

impl<A, C> Invocation<A, C> {
    /// Capture a call.
    pub fn new(args: A, context: C) -> Self {
        Self { args, context }
    }
}

/// Boxed action wrapped by a rate limiter.
pub(crate) type Action<A, C, R> = Box<dyn FnMut(Invocation<A, C>) -> R + Send + 'static>;

/// A wrapped action that may be triggered again from inside itself.
///
/// Calls from other threads wait for the running invocation. A call made on
/// the thread that is already running the action is queued instead, and runs
/// right after the current invocation returns. Only the latest queued
/// invocation is kept.
pub(crate) struct ActionCell<A, C, R> {
    action: Mutex<Action<A, C, R>>,
    reentry: Mutex<Reentry<A, C>>,
}

struct Reentry<A, C> {
    owner: Option<ThreadId>,
    queued: Option<Invocation<A, C>>,
}

impl<A, C, R> ActionCell<A, C, R> {
    pub(crate) fn new<F>(action: F) -> Self
    where
        F: FnMut(Invocation<A, C>) -> R + Send + 'static,
    {
        Self {
            action: Mutex::new(Box::new(action)),
            reentry: Mutex::new(Reentry {
                owner: None,
                queued: None,
            }),
        }
    }

    /// Run `invocation`, handing every result to `record`.
    pub(crate) fn run(&self, invocation: Invocation<A, C>, mut record: impl FnMut(R)) {
        let me = thread::current().id();
        {
            let mut reentry = self.reentry.lock();
            if reentry.owner == Some(me) {
                trace!("Re-entrant invocation queued");
                reentry.queued = Some(invocation);
                return;
            }
        }

        let mut action = self.action.lock();
        self.reentry.lock().owner = Some(me);
        let _owner = OwnerGuard(&self.reentry);

        let mut next = Some(invocation);
        while let Some(invocation) = next {
            record((&mut **action)(invocation));
            next = self.reentry.lock().queued.take();
        }
    }
}

/// Releases ownership even when the action panics.
struct OwnerGuard<'a, A, C>(&'a Mutex<Reentry<A, C>>);

impl<A, C> Drop for OwnerGuard<'_, A, C> {
    fn drop(&mut self) {
        let mut reentry = self.0.lock();
        reentry.owner = None;
        reentry.queued = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_nested_run_is_queued() {
        let slot: Arc<Mutex<Option<Arc<ActionCell<u32, (), u32>>>>> = Arc::new(Mutex::new(None));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_slot = slot.clone();
        let recorded = seen.clone();
        let cell = Arc::new(ActionCell::new(move |inv: Invocation<u32>| {
            recorded.lock().push(inv.args);
            if inv.args < 2 {
                let cell = inner_slot.lock().clone();
                if let Some(cell) = cell {
                    cell.run(Invocation::new(inv.args + 1, ()), |_| {});
                }
            }
            inv.args * 10
        }));
        *slot.lock() = Some(cell.clone());

        let mut results = Vec::new();
        cell.run(Invocation::new(0, ()), |r| results.push(r));

        assert_eq!(*seen.lock(), vec![0, 1, 2]);
        assert_eq!(results, vec![0, 10, 20]);
    }
}
