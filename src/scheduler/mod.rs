//! Frame scheduling seam between the engine and whatever drives it.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Receives the engine's request for another step on the next frame.
pub trait FrameScheduler {
    fn schedule_next(&mut self);

    /// Drops any frame requested but not yet delivered.
    fn cancel(&mut self);
}

/// Scheduler that just queues requests; the driver drains them synchronously.
#[derive(Debug, Default)]
pub struct QueuedFrames {
    pending: usize,
    requested: u64,
}

impl QueuedFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one pending frame, if any.
    pub fn take_frame(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Total frames requested since creation.
    pub fn requested(&self) -> u64 {
        self.requested
    }

}

impl FrameScheduler for QueuedFrames {
    fn schedule_next(&mut self) {
        self.pending += 1;
        self.requested += 1;
    }

    fn cancel(&mut self) {
        self.pending = 0;
    }
}

/// Sliding-window step throughput, for diagnostics only.
#[derive(Debug, Clone)]
pub struct StepRate {
    window: usize,
    stamps: VecDeque<Instant>,
}

impl StepRate {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
            stamps: VecDeque::new(),
        }
    }

    pub fn record(&mut self, now: Instant) {
        self.stamps.push_back(now);
        if self.stamps.len() > self.window {
            self.stamps.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
    }

    pub fn steps_per_second(&self) -> Option<f64> {
        let (first, last) = (self.stamps.front()?, self.stamps.back()?);
        let elapsed = last.duration_since(*first);
        if self.stamps.len() < 2 || elapsed == Duration::ZERO {
            return None;
        }
        Some((self.stamps.len() - 1) as f64 / elapsed.as_secs_f64())
    }
}
