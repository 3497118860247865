//! Clock sources for the recording marker backend.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Microsecond clock
pub trait Clock {
    fn now_us(&self) -> u64;
}

/// Wall clock, measured from construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Hand-advanced clock for replays and tests
///
/// Clones share the same time, so a caller can keep one handle and move
/// another into the backend.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, micros: u64) {
        self.now.set(self.now.get().saturating_add(micros));
    }

    pub fn set(&self, micros: u64) {
        self.now.set(micros);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(250);
        handle.advance(50);
        assert_eq!(clock.now_us(), 300);
        clock.set(10);
        assert_eq!(handle.now_us(), 10);
    }

    #[test]
    fn test_monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now_us();
        assert!(clock.now_us() >= first);
    }
}
