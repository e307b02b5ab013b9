//! Time source for backup timestamps.

use chrono::{DateTime, Duration, Local};
use parking_lot::Mutex;

/// Supplies the wall-clock time used to name snapshots.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The real local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
///
/// Every call to [`Clock::now`] returns the current instant and then
/// advances it by `step`, so consecutive snapshots get distinct names.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Local>>,
    step: Duration,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>, step: Duration) -> Self {
        Self {
            current: Mutex::new(start),
            step,
        }
    }

    /// Start now, ticking one second per reading.
    pub fn ticking() -> Self {
        Self::new(Local::now(), Duration::seconds(1))
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        let mut current = self.current.lock();
        let now = *current;
        *current += self.step;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_steps() {
        let clock = ManualClock::ticking();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(b - a, Duration::seconds(1));

        clock.advance(Duration::minutes(5));
        let c = clock.now();
        assert_eq!(c - b, Duration::seconds(301));
    }
}
