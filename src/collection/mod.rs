//! Array coercion, key-ordered flattening and step queues.

mod array;
mod queue;

pub use array::{make_array, numeric_key_order, trans_object_attr_into_array};
pub use queue::{
    run_rejectable_queue, run_stoppable_queue, AsyncStep, QueueError, Step, StepOutcome,
};
