//! # mhz
//!
//! Estimate a CPU's effective clock frequency through software timing alone,
//! without trusting any OS-reported frequency value.
//!
//! Two fixed-length workloads of serially-dependent XOR chains execute 50
//! and 250 operations per iteration respectively, a difference of exactly
//! [`CYCLE_DELTA`] cycles per iteration that the processor cannot hide
//! behind out-of-order or parallel execution. A self-calibrating driver
//! grows the iteration count until wall-clock timing resolves the
//! difference reliably, then derives:
//!
//! ```text
//! cpu_mhz = count * CYCLE_DELTA / (long_min_us - short_min_us)
//! ```
//!
//! Cycles per microsecond is MHz, so the quotient needs no further scaling.
//! On x86_64 and aarch64 a hardware cycle counter bracketing the same runs
//! yields a second, independently derived estimate.
//!
//! The result is internally self-consistent rather than guaranteed accurate
//! against true hardware frequency: frequency scaling, turbo ramping and
//! scheduler noise all move the number, which is why measurements are
//! min-of-5 sampled and why [`preheat::spin_for`] exists.
//!
//! ## Quick start
//!
//! ```ignore
//! let m = mhz::measure();
//! if let Some(cpu) = m.cpu_mhz {
//!     println!("~{:.0} MHz over {} iterations", cpu, m.count);
//! }
//! ```
//!
//! For repeated rounds, keep the calibrated count as the next seed:
//!
//! ```ignore
//! use mhz::FrequencyMeter;
//!
//! let meter = FrequencyMeter::new();
//! let mut count = 1_000;
//! loop {
//!     let m = meter.measure(count);
//!     count = m.count;
//!     println!("{:?}", m.cpu_mhz);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod meter;
mod result;
mod workload;

// Collaborator modules
pub mod output;
pub mod preheat;
pub mod timing;

// Re-exports for public API
pub use config::Config;
pub use constants::{
    CYCLE_DELTA, DEFAULT_SEED_COUNT, MAX_RETRIES, OPS_PER_ITER_LONG, OPS_PER_ITER_SHORT,
    RUNS_PER_LOOP, TIME_FLOOR_US,
};
pub use meter::FrequencyMeter;
pub use result::{LoopStats, Measurement, MeasurementQuality, TimingSample};
pub use workload::{run_long, run_short};

/// Run one calibration round with the default configuration and seed count.
///
/// Equivalent to `FrequencyMeter::new().measure(DEFAULT_SEED_COUNT)`. For
/// repeated rounds, construct a [`FrequencyMeter`] and feed each round's
/// calibrated count back as the next seed.
pub fn measure() -> Measurement {
    FrequencyMeter::new().measure(DEFAULT_SEED_COUNT)
}

/// Whether this architecture exposes a hardware cycle counter.
///
/// When `false`, measurements carry no tick data and no counter-based
/// estimate; this is a capability gap, not an error.
pub fn has_hardware_counter() -> bool {
    timing::counter::available()
}
