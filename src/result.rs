//! Measurement result types.

use serde::{Deserialize, Serialize};

/// One workload invocation bracketed by timer reads.
///
/// `wall_us` is non-negative by construction under the monotonic clock;
/// `ticks` is present only when the architecture exposes a cycle counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimingSample {
    /// Elapsed wall-clock microseconds.
    pub wall_us: i64,
    /// Elapsed hardware counter ticks, if a counter exists.
    pub ticks: Option<u64>,
}

/// Five-run minima for one workload.
///
/// Wall time and counter ticks are minimized independently across the runs:
/// each minimum is the sample least contaminated by preemption, and the two
/// need not come from the same run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoopStats {
    /// Minimum elapsed wall-clock microseconds across the runs.
    pub wall_us: i64,
    /// Minimum elapsed counter ticks across the runs, if a counter exists.
    pub ticks: Option<u64>,
}

/// How trustworthy a calibration round's arithmetic inputs were.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MeasurementQuality {
    /// Floor reached and the two minima were distinguishable.
    Calibrated,
    /// Retry budget ran out below the time floor; the estimate stands on a
    /// shorter-than-intended measurement window.
    FloorNotReached,
    /// Short and long minima were numerically equal after exhausting the
    /// retry budget: the timer could not distinguish the workloads and no
    /// frequency could be derived.
    Indistinguishable,
}

impl MeasurementQuality {
    /// Whether the round ended without a fully calibrated measurement.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, MeasurementQuality::Calibrated)
    }
}

/// Result of one calibration round.
///
/// Everything the caller needs to report the round: the calibrated iteration
/// count (hand it back as the seed for the next round to amortize
/// recalibration), both five-run minima, and the derived estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Iteration count the round settled on.
    pub count: u64,

    /// Five-run minima for the short workload.
    pub short: LoopStats,

    /// Five-run minima for the long workload.
    pub long: LoopStats,

    /// Estimated CPU frequency in MHz (cycles per microsecond).
    ///
    /// `None` exactly when the wall-time delta between the two workloads was
    /// zero; the degenerate case is reported, never divided through.
    pub cpu_mhz: Option<f64>,

    /// Counter rate relative to wall-clock time, in MHz.
    ///
    /// `None` when no hardware counter exists or the wall-time delta was
    /// zero.
    pub tsc_mhz: Option<f64>,

    /// Quality of the round.
    pub quality: MeasurementQuality,

    /// Cycle counter used ("rdtsc", "cntvct_el0" or "none").
    pub counter: String,
}

impl Measurement {
    /// Wall-time delta between the long and short minima, in microseconds.
    pub fn wall_delta_us(&self) -> i64 {
        self.long.wall_us - self.short.wall_us
    }

    /// Counter-tick delta between the long and short minima.
    pub fn tick_delta(&self) -> Option<u64> {
        match (self.long.ticks, self.short.ticks) {
            (Some(long), Some(short)) => Some(long.saturating_sub(short)),
            _ => None,
        }
    }
}
