//! Timing primitives for the measurement driver.
//!
//! Two independent sources:
//! - [`Clock`]: a cheap microsecond wall-clock read, monotonic by default
//!   with a clamping non-monotonic fallback.
//! - [`counter`]: a best-effort 64-bit hardware cycle counter
//!   (`rdtsc` on x86_64, `cntvct_el0` on aarch64, absent elsewhere).
//!
//! The driver derives its primary frequency estimate from the clock alone;
//! the counter, when present, yields a second independently derived estimate
//! over the same workload.

mod clock;
pub mod counter;

pub use clock::Clock;
