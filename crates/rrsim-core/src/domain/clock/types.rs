//! Clock Types

use std::time::Duration;

/// Logical time unit ("u.t." in traces)
pub type Tick = u64;

/// Point-in-time view of the clock
///
/// Taken under a single read lock so `now` and `idle_for` are consistent
/// with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// Current logical time
    pub now: Tick,

    /// Wall time elapsed since the last unit increment
    pub idle_for: Duration,
}

impl ClockReading {
    /// Check whether the clock has been quiet for longer than `grace`
    #[inline]
    pub fn is_idle_longer_than(&self, grace: Duration) -> bool {
        self.idle_for > grace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_comparison_is_strict() {
        let reading = ClockReading {
            now: 3,
            idle_for: Duration::from_millis(10),
        };

        assert!(reading.is_idle_longer_than(Duration::from_millis(9)));
        assert!(!reading.is_idle_longer_than(Duration::from_millis(10)));
    }
}
