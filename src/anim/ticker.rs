//! Frame-driven fixed-interval ticker
//!
//! Replaces host interval timers: the owner feeds it frame time and it reports
//! how many periods elapsed. Stopping is synchronous, so no tick can fire after
//! `stop()` returns.

use crate::consts::FRAMES_PER_SECOND;

/// Shortest accepted interval: one host frame
pub const MIN_INTERVAL: f32 = 1.0 / FRAMES_PER_SECOND;

/// Fires once every `interval` seconds while running
#[derive(Debug, Clone)]
pub struct IntervalTicker {
    interval: f32,
    accumulator: f32,
    running: bool,
}

impl IntervalTicker {
    pub fn new(interval: f32) -> Self {
        Self {
            // NaN and non-positive intervals also end up here
            interval: if interval >= MIN_INTERVAL { interval } else { MIN_INTERVAL },
            accumulator: 0.0,
            running: false,
        }
    }

    /// Start ticking. Returns false if the ticker was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.accumulator = 0.0;
        true
    }

    /// Stop ticking and drop any partial period
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Advance by `dt` seconds and return how many ticks fired
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.running {
            return 0;
        }
        self.accumulator += dt.max(0.0);
        let mut fired = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_idle_never_fires() {
        let mut ticker = IntervalTicker::new(1.0);
        assert_eq!(ticker.advance(10.0), 0);
    }

    #[test]
    fn test_ticker_fires_per_interval() {
        let mut ticker = IntervalTicker::new(1.0);
        assert!(ticker.start());
        assert_eq!(ticker.advance(0.5), 0);
        assert_eq!(ticker.advance(0.5), 1);
        assert_eq!(ticker.advance(2.25), 2);
        assert_eq!(ticker.advance(0.75), 1);
    }

    #[test]
    fn test_second_start_is_noop() {
        let mut ticker = IntervalTicker::new(1.0);
        assert!(ticker.start());
        ticker.advance(0.75);
        assert!(!ticker.start());
        // Partial period survives the ignored start
        assert_eq!(ticker.advance(0.25), 1);
    }

    #[test]
    fn test_interval_floors_at_one_frame() {
        for bad in [0.0, -1.0, f32::NAN, 1e-9] {
            let mut ticker = IntervalTicker::new(bad);
            assert_eq!(ticker.interval(), MIN_INTERVAL);
            ticker.start();
            // A capped 0.25s frame fires at most 15 times
            assert!(ticker.advance(0.25) <= 15);
        }
    }

    #[test]
    fn test_stop_is_synchronous() {
        let mut ticker = IntervalTicker::new(1.0);
        ticker.start();
        ticker.advance(0.99);
        ticker.stop();
        assert_eq!(ticker.advance(5.0), 0);
        assert!(!ticker.is_running());
    }
}
