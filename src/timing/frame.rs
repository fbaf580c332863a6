//! `requestAnimationFrame` / `cancelAnimationFrame` shims.
//!
//! Outside a browser there is no compositor to sync with, so a frame is a
//! one-shot timer at a fixed interval (~60 Hz by default).

use std::time::Duration;
use tokio::time::Instant;

use super::timer::{Timer, TokioTimer};
use crate::config::TimingConfig;
use crate::error::Result;

/// Interval used when none is configured.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(17);

/// Handle to a requested frame.
#[derive(Debug)]
pub struct FrameHandle<H>(H);

/// Frame scheduler on top of a [`Timer`].
#[derive(Debug, Clone)]
pub struct AnimationFrames<T: Timer = TokioTimer> {
    timer: T,
    interval: Duration,
}

impl AnimationFrames<TokioTimer> {
    /// Frame scheduler on the current tokio runtime.
    pub fn new() -> Result<Self> {
        Ok(Self::with_timer(TokioTimer::new()?, DEFAULT_FRAME_INTERVAL))
    }

    /// Frame scheduler using the configured interval.
    pub fn from_config(config: &TimingConfig) -> Result<Self> {
        Ok(Self::with_timer(TokioTimer::new()?, config.frame_interval()))
    }
}

impl<T: Timer + Clone> AnimationFrames<T> {
    /// Frame scheduler on an explicit timer.
    pub fn with_timer(timer: T, interval: Duration) -> Self {
        Self { timer, interval }
    }

    /// Run `callback` on the next frame with the frame timestamp.
    pub fn request<F>(&self, callback: F) -> FrameHandle<T::Handle>
    where
        F: FnOnce(Instant) + Send + 'static,
    {
        let timer = self.timer.clone();
        FrameHandle(
            self.timer
                .set_timer(self.interval, Box::new(move || callback(timer.now()))),
        )
    }

    /// Cancel a frame that has not run yet.
    pub fn cancel(&self, handle: FrameHandle<T::Handle>) {
        self.timer.clear_timer(handle.0);
    }

    /// The frame interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Request a frame on the current tokio runtime.
pub fn request_animation_frame<F>(callback: F) -> Result<FrameHandle<tokio::task::AbortHandle>>
where
    F: FnOnce(Instant) + Send + 'static,
{
    Ok(AnimationFrames::new()?.request(callback))
}

/// Cancel a frame requested with [`request_animation_frame`].
pub fn cancel_animation_frame(handle: FrameHandle<tokio::task::AbortHandle>) {
    handle.0.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_frame_runs_after_interval() {
        let start = Instant::now();
        let fired = Arc::new(Mutex::new(None));
        let slot = fired.clone();

        request_animation_frame(move |at| *slot.lock() = Some(at)).unwrap();

        sleep(Duration::from_millis(10)).await;
        assert!(fired.lock().is_none());

        sleep(Duration::from_millis(10)).await;
        let at = (*fired.lock()).expect("frame should have run");
        assert!(at - start >= DEFAULT_FRAME_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_frame_does_not_run() {
        let fired = Arc::new(Mutex::new(false));
        let slot = fired.clone();

        let handle = request_animation_frame(move |_| *slot.lock() = true).unwrap();
        cancel_animation_frame(handle);

        sleep(Duration::from_millis(50)).await;
        assert!(!*fired.lock());
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_interval() {
        let config = TimingConfig {
            frame_interval_ms: 40,
            ..TimingConfig::default()
        };
        let frames = AnimationFrames::from_config(&config).unwrap();
        assert_eq!(frames.interval(), Duration::from_millis(40));

        let fired = Arc::new(Mutex::new(false));
        let slot = fired.clone();
        let _handle = frames.request(move |_| *slot.lock() = true);

        sleep(Duration::from_millis(30)).await;
        assert!(!*fired.lock());
        sleep(Duration::from_millis(15)).await;
        assert!(*fired.lock());
    }
}
