//! Frame timing
//!
//! Converts host timestamps into simulation deltas and keeps a rolling
//! one-second frame count for diagnostics.

use crate::consts::MAX_FRAME_DELTA_MS;

#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<f64>,
    window_start: f64,
    frames: u32,
    fps: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta (ms) since the previous call. The first call after creation or
    /// `reset` yields 0; backwards and huge jumps are clamped.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last {
            Some(last) => ((now_ms - last) as f32).max(0.0).min(MAX_FRAME_DELTA_MS),
            None => {
                self.window_start = now_ms;
                0.0
            }
        };
        self.last = Some(now_ms);

        self.frames += 1;
        if now_ms - self.window_start >= 1000.0 {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start = now_ms;
            log::trace!("{} fps", self.fps);
        }

        delta
    }

    /// Forget the previous timestamp (after a suspension)
    pub fn reset(&mut self) {
        self.last = None;
        self.frames = 0;
    }

    /// Frames counted in the last full second
    pub fn fps(&self) -> u32 {
        self.fps
    }
}
