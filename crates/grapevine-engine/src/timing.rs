//! Frame pacing.
//!
//! The gameplay core counts frames, never wall time. [`FrameLimiter`] is the
//! driver's "wait until the next tick" primitive and keeps an average of
//! recent frame times for the FPS readout.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Something the driver can wait on between frames.
pub trait FrameClock {
    /// Marks the start of a frame.
    fn begin_frame(&mut self);

    /// Blocks until the current frame's budget is used up.
    fn wait_for_next_frame(&mut self);
}

/// Sleeps away the rest of each frame's budget.
#[derive(Debug)]
pub struct FrameLimiter {
    target_fps: u32,
    frame_budget: Duration,
    frame_start: Instant,
    last_frame: Option<Instant>,
    frame_times: VecDeque<f32>,
    max_samples: usize,
}

impl Default for FrameLimiter {
    fn default() -> Self {
        Self::new(30)
    }
}

impl FrameLimiter {
    /// Creates a limiter for the given rate. Zero is treated as one.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        Self {
            target_fps,
            frame_budget: budget_for(target_fps),
            frame_start: Instant::now(),
            last_frame: None,
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Target frames per second.
    #[must_use]
    pub const fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Wall time allotted to one frame.
    #[must_use]
    pub const fn frame_budget(&self) -> Duration {
        self.frame_budget
    }

    /// Changes the target rate.
    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps.max(1);
        self.frame_budget = budget_for(self.target_fps);
    }

    /// Records a frame start and returns the time since the previous one.
    pub fn mark_frame(&mut self) -> Duration {
        let now = Instant::now();
        let dt = self.last_frame.map_or(Duration::ZERO, |last| now - last);
        if self.last_frame.is_some() {
            self.frame_times.push_back(dt.as_secs_f32());
            if self.frame_times.len() > self.max_samples {
                self.frame_times.pop_front();
            }
        }
        self.last_frame = Some(now);
        self.frame_start = now;
        dt
    }

    /// Time left in the current frame's budget.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.frame_budget.saturating_sub(self.frame_start.elapsed())
    }

    /// Sleeps for the remainder of the frame budget.
    pub fn sleep_remainder(&self) {
        let remaining = self.remaining();
        if remaining > Duration::from_millis(1) {
            std::thread::sleep(remaining - Duration::from_millis(1));
        }
        while self.frame_start.elapsed() < self.frame_budget {
            std::hint::spin_loop();
        }
    }

    /// FPS averaged over recent frames.
    #[must_use]
    pub fn current_fps(&self) -> f32 {
        let avg = self.average_frame_time();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    /// Average frame time in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        self.average_frame_time() * 1000.0
    }

    fn average_frame_time(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }

    /// Forgets frame history (after a pause or a load).
    pub fn reset(&mut self) {
        self.frame_start = Instant::now();
        self.last_frame = None;
        self.frame_times.clear();
    }
}

impl FrameClock for FrameLimiter {
    fn begin_frame(&mut self) {
        self.mark_frame();
    }

    fn wait_for_next_frame(&mut self) {
        self.sleep_remainder();
    }
}

fn budget_for(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps))
}

/// A clock that never waits, for tests and replays.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Unpaced {
    frames: u64,
}

impl Unpaced {
    /// Frames started so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameClock for Unpaced {
    fn begin_frame(&mut self) {
        self.frames += 1;
    }

    fn wait_for_next_frame(&mut self) {}
}
