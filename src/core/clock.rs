use std::time::{Duration, Instant};

/// Frame-locked simulation clock: every tick moves the track by the same
/// scroll delta, regardless of wall time.
#[derive(Debug, Clone)]
pub struct FrameClock {
    scroll_delta: f32,
    frame: u64,
}

impl FrameClock {
    pub fn new(scroll_delta: f32) -> Self {
        Self {
            scroll_delta: scroll_delta.max(0.0),
            frame: 0,
        }
    }

    /// Counts one frame and returns the distance notes travel in it.
    pub fn tick(&mut self) -> f32 {
        self.frame += 1;
        self.scroll_delta
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }
}

pub struct FPSCounter {
    last_update_time: Instant,
    frames_since_last_update: u32,
}

impl FPSCounter {
    pub fn new() -> Self {
        FPSCounter {
            last_update_time: Instant::now(),
            frames_since_last_update: 0,
        }
    }

    /// Returns `Some(fps)` roughly once per second. Call once per rendered frame.
    pub fn update(&mut self) -> Option<f32> {
        self.update_at(Instant::now())
    }

    fn update_at(&mut self, now: Instant) -> Option<f32> {
        self.frames_since_last_update += 1;
        let elapsed = now.duration_since(self.last_update_time);
        if elapsed < Duration::from_secs(1) {
            return None;
        }

        let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
        self.frames_since_last_update = 0;
        // Keep a steady one-second cadence unless we fell far behind.
        self.last_update_time += Duration::from_secs(1);
        if self.last_update_time + Duration::from_secs(1) < now {
            self.last_update_time = now;
        }
        Some(fps)
    }
}

impl Default for FPSCounter {
    fn default() -> Self {
        Self::new()
    }
}
