use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::warn;
use tokio::runtime::Handle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::{AnimationDriver, AnimationHandle, OnProgress};

/// Frame-loop animator on the tokio timer.
///
/// Each tick reports `min(elapsed / duration, 1.0)`; the loop ends after
/// reporting `1.0`. Must be started from inside a tokio runtime.
#[derive(Debug, Clone, Copy)]
pub struct FrameAnimator {
    frame: Duration,
}

impl FrameAnimator {
    pub fn new(frame: Duration) -> Self {
        Self {
            frame: frame.max(Duration::from_millis(1)),
        }
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }
}

impl Default for FrameAnimator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FRAME_INTERVAL)
    }
}

impl AnimationDriver for FrameAnimator {
    fn start(&self, duration: Duration, on_progress: OnProgress) -> AnimationHandle {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("animation requested outside a tokio runtime; jumping to the end");
                on_progress(1.0);
                return AnimationHandle::detached();
            }
        };

        // Held while a frame is reported so cancel() cannot interleave with it.
        let cancelled = Arc::new(Mutex::new(false));
        let frame = self.frame;
        let task_cancelled = cancelled.clone();

        let task = runtime.spawn(async move {
            let started = Instant::now();
            let mut ticks = time::interval(frame);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;
                let progress = if duration.is_zero() {
                    1.0
                } else {
                    (started.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0)
                };

                let keep_going = {
                    let cancelled = task_cancelled.lock().unwrap_or_else(|e| e.into_inner());
                    if *cancelled {
                        false
                    } else {
                        on_progress(progress);
                        progress < 1.0
                    }
                };
                if !keep_going {
                    break;
                }
            }
        });

        AnimationHandle::new(move || {
            *cancelled.lock().unwrap_or_else(|e| e.into_inner()) = true;
            task.abort();
        })
    }
}
