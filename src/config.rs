//! Configuration for the measurement driver.

use crate::constants::{MAX_RETRIES, RUNS_PER_LOOP, TIME_FLOOR_US};

/// Configuration options for [`FrequencyMeter`](crate::FrequencyMeter).
///
/// The defaults are the documented invariants of the calibration protocol;
/// lowering the floor or the retry budget trades accuracy for speed (useful
/// in tests), it does not change the protocol's shape.
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum acceptable short-loop time in microseconds (default: 20,000).
    ///
    /// The iteration count grows until a five-run minimum reaches this
    /// floor: doubling while under half the floor, then by 5/4.
    pub time_floor_us: i64,

    /// Retry budget shared by the grow and validate phases (default: 24).
    ///
    /// Once exhausted the driver proceeds with whatever values it has;
    /// termination is guaranteed even when a calibrated result is not.
    pub max_retries: u32,

    /// Back-to-back runs per workload, of which the minimum elapsed time is
    /// kept (default: 5).
    pub runs_per_loop: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_floor_us: TIME_FLOOR_US,
            max_retries: MAX_RETRIES,
            runs_per_loop: RUNS_PER_LOOP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_protocol_constants() {
        let config = Config::default();
        assert_eq!(config.time_floor_us, 20_000);
        assert_eq!(config.max_retries, 24);
        assert_eq!(config.runs_per_loop, 5);
    }
}
