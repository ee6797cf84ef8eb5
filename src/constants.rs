//! Constants of the calibration protocol.
//!
//! These are documented invariants, not tuning knobs: the workload op counts
//! are baked into the generated instruction sequences, and the floor/retry
//! values bound every calibration round. `Config` surfaces the adjustable
//! subset.

/// Elementary dependent operations executed per iteration of the short loop.
pub const OPS_PER_ITER_SHORT: u64 = 50;

/// Elementary dependent operations executed per iteration of the long loop.
pub const OPS_PER_ITER_LONG: u64 = 250;

/// Exact per-iteration operation difference between the long and short loops.
///
/// Identical across repeated calls for the same build; never recomputed at
/// runtime. The frequency computation divides `count * CYCLE_DELTA` by the
/// wall-time delta in microseconds, so the quotient is cycles per
/// microsecond, which is MHz with no further scaling.
pub const CYCLE_DELTA: u64 = OPS_PER_ITER_LONG - OPS_PER_ITER_SHORT;

/// Minimum acceptable short-loop time in microseconds.
///
/// Below this floor, timing noise and timer granularity dominate; the driver
/// grows the iteration count until a five-run minimum reaches it.
pub const TIME_FLOOR_US: i64 = 20_000;

/// Retry budget shared by the grow and validate phases of one round.
///
/// 24 doublings allow the count to rise ~16M times above the initial
/// estimate before the driver gives up and returns a best-effort result.
pub const MAX_RETRIES: u32 = 24;

/// Back-to-back runs per workload; the minimum elapsed time is kept.
///
/// The minimum, not the average: it is the sample least contaminated by
/// scheduler preemption and interrupts.
pub const RUNS_PER_LOOP: u32 = 5;

/// Initial iteration count when the caller has no calibration hint.
pub const DEFAULT_SEED_COUNT: u64 = 1_000;
