//! Step queues that run in order and stop on request.

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::debug;

/// What a queue step asks the runner to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Run the next step
    Continue,
    /// Stop the queue here
    Stop,
}

impl From<bool> for StepOutcome {
    fn from(keep_going: bool) -> Self {
        if keep_going {
            StepOutcome::Continue
        } else {
            StepOutcome::Stop
        }
    }
}

/// One entry of a synchronous queue.
pub enum Step<'a, A> {
    /// A fixed outcome
    Outcome(StepOutcome),
    /// A function run with the queue arguments
    Call(Box<dyn FnOnce(&A) -> StepOutcome + 'a>),
}

impl<'a, A> Step<'a, A> {
    /// Wrap a function as a step.
    pub fn call<F>(f: F) -> Self
    where
        F: FnOnce(&A) -> StepOutcome + 'a,
    {
        Step::Call(Box::new(f))
    }
}

/// Run `queue` in order with `args`.
///
/// Returns `false` as soon as a step yields [`StepOutcome::Stop`], `true` once
/// every step has run.
pub fn run_stoppable_queue<'a, A, I>(queue: I, args: &A) -> bool
where
    I: IntoIterator<Item = Step<'a, A>>,
{
    for (index, step) in queue.into_iter().enumerate() {
        let outcome = match step {
            Step::Outcome(outcome) => outcome,
            Step::Call(f) => f(args),
        };
        if outcome == StepOutcome::Stop {
            debug!(step = index, "Stoppable queue stopped");
            return false;
        }
    }
    true
}

/// Why a rejectable queue did not finish.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError<E> {
    /// A step returned [`StepOutcome::Stop`]
    #[error("queue stopped")]
    Stopped,
    /// A step's future failed
    #[error("queue step rejected: {0}")]
    Rejected(E),
}

/// One entry of an asynchronous queue.
pub enum AsyncStep<'a, A, E> {
    /// A fixed outcome
    Outcome(StepOutcome),
    /// Work to await before the next step
    Future(BoxFuture<'a, Result<(), E>>),
    /// A function run with the queue arguments, producing another step
    Call(Box<dyn FnOnce(&A) -> AsyncStep<'a, A, E> + Send + 'a>),
}

impl<'a, A, E> AsyncStep<'a, A, E> {
    /// Wrap a function as a step.
    pub fn call<F>(f: F) -> Self
    where
        F: FnOnce(&A) -> AsyncStep<'a, A, E> + Send + 'a,
    {
        AsyncStep::Call(Box::new(f))
    }

    /// Wrap a future as a step.
    pub fn future<Fut>(fut: Fut) -> Self
    where
        Fut: std::future::Future<Output = Result<(), E>> + Send + 'a,
    {
        AsyncStep::Future(Box::pin(fut))
    }
}

/// Run `queue` in order with `args`, awaiting each step's future before
/// starting the next.
///
/// A `Stop` outcome rejects with [`QueueError::Stopped`]; a failed future
/// rejects with [`QueueError::Rejected`]. A future that succeeds always
/// continues, whatever it computed.
pub async fn run_rejectable_queue<'a, A, E, I>(queue: I, args: A) -> Result<(), QueueError<E>>
where
    I: IntoIterator<Item = AsyncStep<'a, A, E>>,
{
    for (index, mut step) in queue.into_iter().enumerate() {
        loop {
            match step {
                AsyncStep::Call(f) => step = f(&args),
                AsyncStep::Outcome(StepOutcome::Continue) => break,
                AsyncStep::Outcome(StepOutcome::Stop) => {
                    debug!(step = index, "Rejectable queue stopped");
                    return Err(QueueError::Stopped);
                }
                AsyncStep::Future(fut) => {
                    if let Err(e) = fut.await {
                        debug!(step = index, "Rejectable queue step rejected");
                        return Err(QueueError::Rejected(e));
                    }
                    break;
                }
            }
        }
    }
    Ok(())
}
