//! Logical Clock Engine
//!
//! # Design
//! - `RwLock` so the watcher and device workers can read concurrently while
//!   the scheduler holds the only writer.
//! - `advance(n)` re-acquires the write lock per unit. A reader racing with a
//!   long CPU burst observes every intermediate value, exactly as if the
//!   burst were executed one unit at a time.

use super::types::{ClockReading, Tick};
use parking_lot::RwLock;
use std::time::{Duration, Instant};

/// Shared logical clock
///
/// # Example
///
/// ```rust
/// use rrsim_core::domain::clock::LogicalClock;
///
/// let clock = LogicalClock::new();
/// assert_eq!(clock.read(), 0);
///
/// clock.advance(4);
/// assert_eq!(clock.read(), 4);
///
/// clock.tick();
/// assert_eq!(clock.read(), 5);
/// ```
#[derive(Debug)]
pub struct LogicalClock {
    state: RwLock<ClockState>,
}

#[derive(Debug)]
struct ClockState {
    now: Tick,
    last_update: Instant,
}

impl LogicalClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ClockState {
                now: 0,
                last_update: Instant::now(),
            }),
        }
    }

    /// Current logical time
    #[inline]
    pub fn read(&self) -> Tick {
        self.state.read().now
    }

    /// Current time together with the idle duration
    pub fn reading(&self) -> ClockReading {
        let state = self.state.read();
        ClockReading {
            now: state.now,
            idle_for: state.last_update.elapsed(),
        }
    }

    /// Advance by `units`, one unit at a time
    ///
    /// Returns the clock value after the last increment. `advance(0)` is a
    /// no-op and leaves the idle timestamp untouched.
    pub fn advance(&self, units: Tick) -> Tick {
        let mut now = self.read();
        for _ in 0..units {
            now = self.tick();
        }
        now
    }

    /// Advance by exactly one unit
    pub fn tick(&self) -> Tick {
        let mut state = self.state.write();
        state.now += 1;
        state.last_update = Instant::now();
        state.now
    }

    /// Wall time since the last unit increment
    pub fn idle_for(&self) -> Duration {
        self.state.read().last_update.elapsed()
    }
}

impl Default for LogicalClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_advance_returns_final_value() {
        let clock = LogicalClock::new();

        assert_eq!(clock.advance(3), 3);
        assert_eq!(clock.advance(0), 3);
        assert_eq!(clock.read(), 3);
    }

    #[test]
    fn test_advance_resets_idle_timer() {
        let clock = LogicalClock::new();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.idle_for() >= Duration::from_millis(20));

        clock.advance(1);
        assert!(clock.idle_for() < Duration::from_millis(20));
    }

    #[test]
    fn test_zero_advance_keeps_idle_timer() {
        let clock = LogicalClock::new();
        thread::sleep(Duration::from_millis(15));

        clock.advance(0);
        assert!(clock.reading().is_idle_longer_than(Duration::from_millis(10)));
    }

    #[test]
    fn test_concurrent_advances_are_not_lost() {
        let clock = Arc::new(LogicalClock::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let clock = Arc::clone(&clock);
            handles.push(thread::spawn(move || {
                for _ in 0..250 {
                    clock.advance(2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(clock.read(), 8 * 250 * 2);
    }

    #[test]
    fn test_readers_observe_monotonic_values() {
        let clock = Arc::new(LogicalClock::new());
        let writer = {
            let clock = Arc::clone(&clock);
            thread::spawn(move || {
                clock.advance(5_000);
            })
        };

        let mut last = 0;
        while !writer.is_finished() {
            let now = clock.read();
            assert!(now >= last, "clock went backwards: {} < {}", now, last);
            last = now;
        }
        writer.join().unwrap();

        assert_eq!(clock.read(), 5_000);
    }
}
