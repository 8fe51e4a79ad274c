//! Frame pacing and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Delay policy applied after each emitted frame.
pub trait FramePacing {
    fn pause(&mut self);
}

/// Run at full speed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPacing;

impl FramePacing for NoPacing {
    fn pause(&mut self) {}
}

/// Sleep a fixed real-time delay between frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDelay {
    pub delay: Duration,
}

impl FixedDelay {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(ms),
        }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::from_millis(10)
    }
}

impl FramePacing for FixedDelay {
    fn pause(&mut self) {
        thread::sleep(self.delay);
    }
}

impl<P: FramePacing + ?Sized> FramePacing for Box<P> {
    fn pause(&mut self) {
        (**self).pause();
    }
}

/// Build a pacing policy from a per-frame delay; zero disables pacing.
pub fn pacing_from_millis(ms: u64) -> Box<dyn FramePacing + Send> {
    if ms == 0 {
        Box::new(NoPacing)
    } else {
        Box::new(FixedDelay::from_millis(ms))
    }
}

/// Shared flag checked between steps.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
