//! Round timer
//!
//! A round lasts a fixed number of seconds of simulated time. The clock only
//! advances while the engine is running, so a paused round keeps its time.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundClock {
    limit: Option<f32>,
    elapsed: f32,
    /// Set once `advance` has reported the end of the round
    reported: bool,
}

impl RoundClock {
    /// `None` means the round never ends
    pub fn new(limit: Option<f32>) -> Self {
        Self {
            limit,
            elapsed: 0.0,
            reported: false,
        }
    }

    /// Advance by `dt`. Returns true exactly once per round, on the first
    /// tick at or past the limit (the very first tick for a limit `<= 0`).
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.reported {
            return false;
        }
        self.elapsed += dt.max(0.0);
        self.reported = self.is_finished();
        self.reported
    }

    pub fn is_finished(&self) -> bool {
        self.limit.is_some_and(|limit| self.elapsed >= limit)
    }

    pub fn remaining(&self) -> Option<f32> {
        self.limit.map(|limit| (limit - self.elapsed).max(0.0))
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.reported = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finishes_once() {
        let mut clock = RoundClock::new(Some(1.0));
        assert!(!clock.advance(0.5));
        assert!(clock.advance(0.5));
        assert!(!clock.advance(0.5));
        assert!(clock.is_finished());
        assert_eq!(clock.remaining(), Some(0.0));
    }

    #[test]
    fn test_unlimited_never_finishes() {
        let mut clock = RoundClock::new(None);
        for _ in 0..1000 {
            assert!(!clock.advance(0.1));
        }
        assert_eq!(clock.remaining(), None);
    }

    #[test]
    fn test_non_positive_limit_reports_on_first_tick() {
        for limit in [0.0, -5.0] {
            let mut clock = RoundClock::new(Some(limit));
            assert!(clock.is_finished());
            assert!(clock.advance(0.0));
            assert!(!clock.advance(0.1));
            clock.reset();
            assert!(clock.advance(0.1));
        }
    }

    #[test]
    fn test_reset() {
        let mut clock = RoundClock::new(Some(2.0));
        clock.advance(1.5);
        clock.reset();
        assert_eq!(clock.remaining(), Some(2.0));
    }
}
