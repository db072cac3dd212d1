//! Frame-rate readout for the HUD

/// Frames averaged over
const WINDOW: usize = 60;

/// Rolling frames-per-second over the last `WINDOW` timestamps
#[derive(Debug, Clone)]
pub struct FpsCounter {
    /// Timestamps in seconds, oldest overwritten first
    frame_times: [f64; WINDOW],
    index: usize,
    recorded: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frame_times: [0.0; WINDOW],
            index: 0,
            recorded: 0,
            fps: 0,
        }
    }

    /// Record a frame at `now` seconds and return the updated rate
    pub fn record(&mut self, now: f64) -> u32 {
        self.frame_times[self.index] = now;
        self.index = (self.index + 1) % WINDOW;
        self.recorded = (self.recorded + 1).min(WINDOW);

        if self.recorded >= 2 {
            let oldest = if self.recorded == WINDOW {
                self.frame_times[self.index]
            } else {
                self.frame_times[0]
            };
            let elapsed = now - oldest;
            if elapsed > 0.0 {
                self.fps = ((self.recorded - 1) as f64 / elapsed).round() as u32;
            }
        }
        self.fps
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Forget history, e.g. after a pause
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_sixty() {
        let mut counter = FpsCounter::new();
        for i in 0..200 {
            counter.record(i as f64 / 60.0);
        }
        assert_eq!(counter.fps(), 60);
    }

    #[test]
    fn test_partial_window() {
        let mut counter = FpsCounter::new();
        assert_eq!(counter.record(0.0), 0);
        counter.record(0.05);
        assert_eq!(counter.record(0.1), 20);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut counter = FpsCounter::new();
        for i in 0..10 {
            counter.record(i as f64 / 30.0);
        }
        counter.reset();
        assert_eq!(counter.fps(), 0);
        // A long gap before the reset no longer drags the average down
        counter.record(100.0);
        assert_eq!(counter.record(100.0 + 1.0 / 60.0), 60);
    }
}
