//! Animation - time-bounded progress from 0 to 1 that moves a car on screen.
//!
//! The race only needs to start a progress sequence for a duration and to be
//! able to cancel it, so rendering stays behind [`AnimationDriver`]:
//!
//! - [`FrameAnimator`] ticks on a tokio interval, the headless counterpart of
//!   a browser frame loop.
//! - [`NoopAnimator`] reports nothing; races run purely on network timing.
//!
//! ```ignore
//! let animator = FrameAnimator::new(Duration::from_millis(16));
//! let handle = animator.start(Duration::from_secs(5), Box::new(|p| println!("{:.0}%", p * 100.0)));
//! handle.cancel();
//! ```

mod frame;

use std::fmt;
use std::time::Duration;

pub use frame::FrameAnimator;

/// Receives progress in `0.0..=1.0`.
pub type OnProgress = Box<dyn Fn(f64) + Send + Sync>;

/// Capability to animate one car.
pub trait AnimationDriver: Send + Sync {
    /// Start reporting progress over `duration`. Progress ends with `1.0`
    /// unless the returned handle is cancelled first.
    fn start(&self, duration: Duration, on_progress: OnProgress) -> AnimationHandle;
}

/// Cancels a running animation. Dropping the handle lets it run to the end.
pub struct AnimationHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl AnimationHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Stop the animation. No progress is reported after this returns.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// Driver that never reports progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnimator;

impl AnimationDriver for NoopAnimator {
    fn start(&self, _duration: Duration, _on_progress: OnProgress) -> AnimationHandle {
        AnimationHandle::detached()
    }
}
