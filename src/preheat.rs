//! Pre-heat spin-wait.
//!
//! Dynamic frequency scaling ramps the clock up under load; a measurement
//! taken cold sees the ramp, not the settled frequency. Burning CPU for a
//! caller-chosen interval before the first round lets the governor settle.
//! Pre-heat strictly precedes measurement and never runs concurrently with
//! it.

use std::time::Duration;

use crate::timing::Clock;

/// Busy-wait until at least `at_least` has elapsed on the monotonic clock.
///
/// A deliberate spin, not a sleep: the point is to keep the core busy.
pub fn spin_for(at_least: Duration) {
    let clock = Clock::monotonic();
    let target = at_least.as_micros() as u64;
    let start = clock.now_micros();
    while clock.now_micros() - start < target {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_spin_elapses_at_least_requested() {
        let begin = Instant::now();
        spin_for(Duration::from_millis(5));
        assert!(begin.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_zero_spin_returns_immediately() {
        let begin = Instant::now();
        spin_for(Duration::ZERO);
        assert!(begin.elapsed() < Duration::from_secs(1));
    }
}
