//! Polled interval timers and the clock they are checked against.

use embassy_time::{
    Duration,
    Instant,
};

/// Source of the current time for the host loop.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The embassy time driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Fires when at least `interval` has passed since it last fired.
///
/// Never sleeps: callers poll it once per loop iteration and skip the gated
/// work when it reports `false`.
#[derive(Clone, Copy, Debug)]
pub struct IntervalTimer {
    interval: Duration,
    last: Instant,
}

impl IntervalTimer {
    pub const fn new(interval: Duration, anchor: Instant) -> Self {
        Self {
            interval,
            last: anchor,
        }
    }

    /// Restart the period from `anchor`.
    pub const fn reset(&mut self, anchor: Instant) {
        self.last = anchor;
    }

    /// Returns `true` (and re-arms) when the interval has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_interval_has_elapsed() {
        let mut timer = IntervalTimer::new(Duration::from_millis(2000), Instant::from_millis(0));

        assert!(!timer.poll(Instant::from_millis(1999)));
        assert!(timer.poll(Instant::from_millis(2000)));
        // Re-armed at 2000.
        assert!(!timer.poll(Instant::from_millis(3999)));
        assert!(timer.poll(Instant::from_millis(4500)));
    }

    #[test]
    fn clock_going_backwards_does_not_fire() {
        let mut timer = IntervalTimer::new(Duration::from_millis(1), Instant::from_millis(500));
        assert!(!timer.poll(Instant::from_millis(100)));
    }

    #[test]
    fn reset_moves_the_anchor() {
        let mut timer = IntervalTimer::new(Duration::from_millis(10), Instant::from_millis(0));
        timer.reset(Instant::from_millis(100));
        assert!(!timer.poll(Instant::from_millis(105)));
        assert!(timer.poll(Instant::from_millis(110)));
    }
}
