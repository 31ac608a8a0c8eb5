//! Runtime Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wall-clock knobs of a simulation run
///
/// None of these affect simulated results for a given sequence of dispatch
/// decisions; they only control pacing and how long the workers wait before
/// concluding that the system is idle.
///
/// # Example
///
/// ```rust
/// use rrsim_core::domain::system::SimConfig;
/// use std::time::Duration;
///
/// let config: SimConfig = serde_json::from_str(r#"{ "seed": 7 }"#).unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert_eq!(config.idle_grace(), Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Milliseconds without a clock advance before an idle tick or termination
    pub idle_grace_ms: u64,

    /// Microseconds slept by polling loops between checks
    pub poll_interval_us: u64,

    /// Microseconds of wall time per consumed CPU unit
    pub unit_delay_us: u64,

    /// Seed for the random dispatch decisions
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            idle_grace_ms: 500,
            poll_interval_us: 50,
            unit_delay_us: 500,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Short grace period and no pacing, for tests and benchmarks
    pub fn fast() -> Self {
        Self {
            idle_grace_ms: 2,
            poll_interval_us: 20,
            unit_delay_us: 0,
            seed: None,
        }
    }

    /// Set the idle grace period
    pub fn with_idle_grace(mut self, grace: Duration) -> Self {
        self.idle_grace_ms = grace.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Set the polling back-off
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_us = interval.as_micros().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Set the per-unit pacing delay
    pub fn with_unit_delay(mut self, delay: Duration) -> Self {
        self.unit_delay_us = delay.as_micros().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Set the decision seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Wall time the clock must sit still before an idle tick
    #[inline]
    pub fn idle_grace(&self) -> Duration {
        Duration::from_millis(self.idle_grace_ms)
    }

    /// Back-off between polls of an idle worker
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }

    /// Wall time per consumed CPU unit
    #[inline]
    pub fn unit_delay(&self) -> Duration {
        Duration::from_micros(self.unit_delay_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.idle_grace(), Duration::from_millis(500));
        assert_eq!(config.poll_interval(), Duration::from_micros(50));
        assert_eq!(config.unit_delay(), Duration::from_micros(500));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_builder_setters() {
        let config = SimConfig::default()
            .with_idle_grace(Duration::from_millis(10))
            .with_poll_interval(Duration::from_micros(5))
            .with_unit_delay(Duration::ZERO)
            .with_seed(3);

        assert_eq!(config.idle_grace_ms, 10);
        assert_eq!(config.poll_interval_us, 5);
        assert!(config.unit_delay().is_zero());
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_json_round_trip_keeps_missing_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{"unit_delay_us": 0}"#).unwrap();
        assert_eq!(config.unit_delay_us, 0);
        assert_eq!(config.idle_grace_ms, 500);

        let json = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
