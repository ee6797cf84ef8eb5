//! Self-calibrating measurement driver.
//!
//! One call to [`FrequencyMeter::measure`] runs one calibration round:
//!
//! 1. **Measure short**: run the short workload `runs_per_loop` times
//!    back-to-back, each bracketed by clock (and counter) reads; keep the
//!    minimum elapsed time.
//! 2. **Grow check**: while the minimum is under the time floor and budget
//!    remains, grow the iteration count (doubling under half the floor,
//!    by 5/4 above it) and go back to 1.
//! 3. **Measure long**: same as 1 with the long workload.
//! 4. **Validate**: if the two minima are numerically equal the timer is
//!    too coarse at this count: double it and go back to 1 while budget
//!    remains.
//! 5. **Compute**: `cpu_mhz = count * CYCLE_DELTA / delta_us`. The fixed
//!    per-call overhead (call, loop branch, timer reads) is identical in
//!    both measurements and cancels in the subtraction.
//!
//! Budget exhaustion never loops forever and never panics: the round
//! terminates with a degraded [`MeasurementQuality`] and the caller decides
//! what to do with it.

use log::{debug, warn};

use crate::config::Config;
use crate::constants::CYCLE_DELTA;
use crate::result::{LoopStats, Measurement, MeasurementQuality, TimingSample};
use crate::timing::{counter, Clock};
use crate::workload;

/// Measurement driver: owns the clock and the calibration configuration.
///
/// # Example
///
/// ```ignore
/// use mhz::FrequencyMeter;
///
/// let meter = FrequencyMeter::new();
/// let m = meter.measure(1_000);
/// println!("cpu: {:?} MHz at count {}", m.cpu_mhz, m.count);
/// // Seed the next round with the calibrated count:
/// let m2 = meter.measure(m.count);
/// ```
#[derive(Debug, Default)]
pub struct FrequencyMeter {
    config: Config,
    clock: Clock,
}

impl FrequencyMeter {
    /// Create with the default protocol configuration and a monotonic clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum acceptable short-loop time in microseconds.
    pub fn time_floor_us(mut self, floor: i64) -> Self {
        self.config.time_floor_us = floor;
        self
    }

    /// Set the retry budget shared by the grow and validate phases.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set how many back-to-back runs feed each minimum.
    pub fn runs_per_loop(mut self, runs: u32) -> Self {
        self.config.runs_per_loop = runs;
        self
    }

    /// Replace the clock (e.g. [`Clock::wallclock`] on platforms without a
    /// monotonic source).
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one calibration round from the given seed count.
    ///
    /// Returns the calibrated count (hand it back as the next round's seed),
    /// the five-run minima for both workloads, and the derived estimates.
    ///
    /// # Panics
    ///
    /// Panics if `seed_count` is zero; callers own sanitizing external
    /// input before it reaches the driver.
    pub fn measure(&self, seed_count: u64) -> Measurement {
        assert!(seed_count >= 1, "iteration count must be at least 1");
        let mut probe = ChainProbe { clock: &self.clock };
        calibrate(&mut probe, &self.config, seed_count)
    }
}

/// Seam between the calibration state machine and the timed workloads.
///
/// The real implementation brackets the XOR chains with timer reads; tests
/// drive the state machine with scripted samples.
trait WorkloadProbe {
    fn sample_short(&mut self, count: u64) -> TimingSample;
    fn sample_long(&mut self, count: u64) -> TimingSample;
}

struct ChainProbe<'a> {
    clock: &'a Clock,
}

impl ChainProbe<'_> {
    fn bracket(&self, run: impl FnOnce()) -> TimingSample {
        // Wall-clock reads outermost, counter reads innermost; the ordering
        // is identical for both workloads so the skew cancels.
        let wall_begin = self.clock.now_micros();
        let ticks_begin = counter::read();
        run();
        let ticks = counter::read().saturating_sub(ticks_begin);
        let wall = self.clock.now_micros() - wall_begin;
        TimingSample {
            wall_us: i64::try_from(wall).unwrap_or(i64::MAX),
            ticks: counter::available().then_some(ticks),
        }
    }
}

impl WorkloadProbe for ChainProbe<'_> {
    fn sample_short(&mut self, count: u64) -> TimingSample {
        self.bracket(|| workload::run_short(count))
    }

    fn sample_long(&mut self, count: u64) -> TimingSample {
        self.bracket(|| workload::run_long(count))
    }
}

/// The SEED -> MEASURE_SHORT -> GROW_CHECK -> MEASURE_LONG -> VALIDATE ->
/// COMPUTE state machine.
fn calibrate<P: WorkloadProbe>(probe: &mut P, config: &Config, seed_count: u64) -> Measurement {
    let runs = config.runs_per_loop.max(1);
    let mut count = seed_count;
    let mut retries = config.max_retries;

    loop {
        let short = min_of_runs(runs, || probe.sample_short(count));

        if short.wall_us < config.time_floor_us && retries > 0 {
            retries -= 1;
            let grown = grown_count(count, short.wall_us, config.time_floor_us);
            debug!(
                "short minimum {}us under {}us floor; count {} -> {} ({} retries left)",
                short.wall_us, config.time_floor_us, count, grown, retries
            );
            count = grown;
            continue;
        }

        let long = min_of_runs(runs, || probe.sample_long(count));

        if long.wall_us == short.wall_us && retries > 0 {
            retries -= 1;
            let grown = count.saturating_mul(2);
            debug!(
                "minima indistinguishable at {}us; count {} -> {} ({} retries left)",
                short.wall_us, count, grown, retries
            );
            count = grown;
            continue;
        }

        return compose(count, short, long, config);
    }
}

/// Next iteration count while under the floor: double under half the floor,
/// grow by 5/4 above it. Always strictly larger than the current count.
fn grown_count(count: u64, wall_us: i64, floor_us: i64) -> u64 {
    let grown = if wall_us < floor_us / 2 {
        count.saturating_mul(2)
    } else {
        count.saturating_mul(5) / 4
    };
    grown.max(count.saturating_add(1))
}

/// Run the sampler `runs` times and keep independent minima for wall time
/// and counter ticks.
fn min_of_runs(runs: u32, mut sample: impl FnMut() -> TimingSample) -> LoopStats {
    let mut stats = LoopStats {
        wall_us: i64::MAX,
        ticks: None,
    };
    for _ in 0..runs {
        let s = sample();
        stats.wall_us = stats.wall_us.min(s.wall_us);
        stats.ticks = match (stats.ticks, s.ticks) {
            (Some(best), Some(t)) => Some(best.min(t)),
            (None, t) => t,
            (best, None) => best,
        };
    }
    stats
}

/// COMPUTE: derive the estimates and classify the round.
fn compose(count: u64, short: LoopStats, long: LoopStats, config: &Config) -> Measurement {
    let delta_us = long.wall_us - short.wall_us;

    let quality = if delta_us <= 0 {
        MeasurementQuality::Indistinguishable
    } else if short.wall_us < config.time_floor_us {
        MeasurementQuality::FloorNotReached
    } else {
        MeasurementQuality::Calibrated
    };

    match quality {
        MeasurementQuality::Indistinguishable => warn!(
            "short and long minima indistinguishable ({}us vs {}us) after retry budget; \
             no frequency derived",
            short.wall_us, long.wall_us
        ),
        MeasurementQuality::FloorNotReached => warn!(
            "short minimum {}us never reached the {}us floor; estimate may be noisy",
            short.wall_us, config.time_floor_us
        ),
        MeasurementQuality::Calibrated => {}
    }

    // count * CYCLE_DELTA extra cycles executed over delta_us extra
    // microseconds; cycles per microsecond is MHz, so the quotient needs no
    // further unit conversion.
    let cpu_mhz =
        (delta_us > 0).then(|| count as f64 * CYCLE_DELTA as f64 / delta_us as f64);

    let tick_delta = match (long.ticks, short.ticks) {
        (Some(l), Some(s)) => Some(l.saturating_sub(s)),
        _ => None,
    };
    let tsc_mhz = match (tick_delta, delta_us > 0) {
        (Some(ticks), true) => Some(ticks as f64 / delta_us as f64),
        _ => None,
    };

    Measurement {
        count,
        short,
        long,
        cpu_mhz,
        tsc_mhz,
        quality,
        counter: counter::name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted probe: replays per-visit wall times (and optional tick
    /// pairs) and records the count each short visit saw.
    struct FakeProbe {
        short_wall: Vec<i64>,
        long_wall: Vec<i64>,
        short_ticks: Option<Vec<u64>>,
        long_ticks: Option<Vec<u64>>,
        short_visit: usize,
        long_visit: usize,
        counts_seen: Vec<u64>,
    }

    impl FakeProbe {
        fn new(short_wall: Vec<i64>, long_wall: Vec<i64>) -> Self {
            Self {
                short_wall,
                long_wall,
                short_ticks: None,
                long_ticks: None,
                short_visit: 0,
                long_visit: 0,
                counts_seen: Vec::new(),
            }
        }

        fn with_ticks(mut self, short: Vec<u64>, long: Vec<u64>) -> Self {
            self.short_ticks = Some(short);
            self.long_ticks = Some(long);
            self
        }
    }

    impl WorkloadProbe for FakeProbe {
        fn sample_short(&mut self, count: u64) -> TimingSample {
            self.counts_seen.push(count);
            let i = self.short_visit.min(self.short_wall.len() - 1);
            self.short_visit += 1;
            TimingSample {
                wall_us: self.short_wall[i],
                ticks: self.short_ticks.as_ref().map(|t| t[i.min(t.len() - 1)]),
            }
        }

        fn sample_long(&mut self, count: u64) -> TimingSample {
            let _ = count;
            let i = self.long_visit.min(self.long_wall.len() - 1);
            self.long_visit += 1;
            TimingSample {
                wall_us: self.long_wall[i],
                ticks: self.long_ticks.as_ref().map(|t| t[i.min(t.len() - 1)]),
            }
        }
    }

    fn one_run_config() -> Config {
        Config {
            runs_per_loop: 1,
            ..Config::default()
        }
    }

    #[test]
    fn test_grow_check_doubles_below_half_floor() {
        // 9,000us is under half the 20,000us floor: the count doubles.
        let mut probe = FakeProbe::new(vec![9_000, 25_000], vec![25_050]);
        let m = calibrate(&mut probe, &one_run_config(), 1_000);

        assert_eq!(probe.counts_seen, vec![1_000, 2_000]);
        assert_eq!(m.count, 2_000);
        // 2000 iterations x 200 extra cycles over 50 extra microseconds.
        assert_eq!(m.cpu_mhz, Some(2_000.0 * 200.0 / 50.0));
        assert_eq!(m.cpu_mhz, Some(8_000.0));
        assert_eq!(m.quality, MeasurementQuality::Calibrated);
    }

    #[test]
    fn test_grow_check_scales_by_five_fourths_above_half_floor() {
        // 15,000us is between half the floor and the floor: 5/4 growth.
        let mut probe = FakeProbe::new(vec![15_000, 25_000], vec![25_050]);
        let m = calibrate(&mut probe, &one_run_config(), 1_000);

        assert_eq!(probe.counts_seen, vec![1_000, 1_250]);
        assert_eq!(m.count, 1_250);
    }

    #[test]
    fn test_count_growth_is_strictly_monotonic() {
        // Short minimum stays under the floor forever; the count must grow
        // strictly on every retry and the round must still terminate.
        let mut probe = FakeProbe::new(vec![100], vec![150]);
        let m = calibrate(&mut probe, &one_run_config(), 1_000);

        assert_eq!(probe.counts_seen.len() as u32, 1 + Config::default().max_retries);
        for pair in probe.counts_seen.windows(2) {
            assert!(pair[1] > pair[0], "counts {:?} not strictly growing", pair);
        }
        assert_eq!(m.quality, MeasurementQuality::FloorNotReached);
        assert!(m.cpu_mhz.is_some());
    }

    #[test]
    fn test_validate_doubles_on_equal_minima() {
        let mut probe = FakeProbe::new(vec![25_000, 25_000], vec![25_000, 25_080]);
        let m = calibrate(&mut probe, &one_run_config(), 1_000);

        assert_eq!(probe.counts_seen, vec![1_000, 2_000]);
        assert_eq!(m.count, 2_000);
        assert_eq!(m.wall_delta_us(), 80);
        assert_eq!(m.quality, MeasurementQuality::Calibrated);
    }

    #[test]
    fn test_indistinguishable_after_budget_is_reported_not_divided() {
        let config = Config {
            runs_per_loop: 1,
            max_retries: 2,
            ..Config::default()
        };
        let mut probe = FakeProbe::new(vec![25_000], vec![25_000]);
        let m = calibrate(&mut probe, &config, 1_000);

        // Two doublings spent, then a degraded result instead of a panic.
        assert_eq!(probe.counts_seen, vec![1_000, 2_000, 4_000]);
        assert_eq!(m.quality, MeasurementQuality::Indistinguishable);
        assert_eq!(m.cpu_mhz, None);
        assert_eq!(m.tsc_mhz, None);
    }

    #[test]
    fn test_estimates_are_finite_when_present() {
        let mut probe = FakeProbe::new(vec![25_000], vec![25_001]);
        let m = calibrate(&mut probe, &one_run_config(), 1_000);
        if let Some(mhz) = m.cpu_mhz {
            assert!(mhz.is_finite());
        }
    }

    #[test]
    fn test_counter_ratio_uses_independent_tick_minima() {
        let mut probe = FakeProbe::new(vec![25_000], vec![25_050])
            .with_ticks(vec![100_000_000], vec![100_400_000]);
        let m = calibrate(&mut probe, &one_run_config(), 1_000);

        assert_eq!(m.tick_delta(), Some(400_000));
        assert_eq!(m.tsc_mhz, Some(400_000.0 / 50.0));
    }

    #[test]
    fn test_min_of_runs_keeps_independent_minima() {
        let samples = [
            TimingSample { wall_us: 30, ticks: Some(90) },
            TimingSample { wall_us: 10, ticks: Some(120) },
            TimingSample { wall_us: 20, ticks: Some(70) },
        ];
        let mut it = samples.iter();
        let stats = min_of_runs(3, || *it.next().unwrap());
        // Minimum wall time from run 2, minimum ticks from run 3.
        assert_eq!(stats.wall_us, 10);
        assert_eq!(stats.ticks, Some(70));
    }

    #[test]
    fn test_grown_count_is_strict_even_for_tiny_counts() {
        // 5/4 of 1 truncates back to 1; strict growth forces 2.
        assert_eq!(grown_count(1, 15_000, 20_000), 2);
        assert_eq!(grown_count(4, 15_000, 20_000), 5);
        assert_eq!(grown_count(1_000, 15_000, 20_000), 1_250);
        assert_eq!(grown_count(1_000, 9_000, 20_000), 2_000);
    }

    #[test]
    fn test_builder() {
        let meter = FrequencyMeter::new()
            .time_floor_us(5_000)
            .max_retries(10)
            .runs_per_loop(3);
        assert_eq!(meter.config().time_floor_us, 5_000);
        assert_eq!(meter.config().max_retries, 10);
        assert_eq!(meter.config().runs_per_loop, 3);
    }

    #[test]
    #[should_panic(expected = "iteration count must be at least 1")]
    fn test_zero_seed_rejected() {
        FrequencyMeter::new().measure(0);
    }
}
