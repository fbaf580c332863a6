//! Timer-driven helpers: debounce, throttle and animation frames.

mod debounce;
mod frame;
mod invocation;
mod throttle;
mod timer;

pub use debounce::{debounce, Debounce};
pub use frame::{
    cancel_animation_frame, request_animation_frame, AnimationFrames, FrameHandle,
    DEFAULT_FRAME_INTERVAL,
};
pub use invocation::Invocation;
pub use throttle::{throttle, Throttle, ThrottleOptions};
pub use timer::{Timer, TimerCallback, TokioTimer};
