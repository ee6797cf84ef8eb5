//! Microsecond wall-clock reads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::warn;

/// A monotonically non-decreasing 64-bit microsecond timestamp source.
///
/// [`Clock::monotonic`] anchors `std::time::Instant` at construction, so a
/// backwards reading is impossible by construction. [`Clock::wallclock`] is
/// the fallback for callers that need absolute time semantics: it reads
/// `SystemTime`, and a backwards jump (NTP step, manual clock change) is
/// detected and clamped to the previous reading so downstream arithmetic
/// never sees a negative elapsed interval.
#[derive(Debug)]
pub struct Clock {
    source: Source,
}

#[derive(Debug)]
enum Source {
    Monotonic { origin: Instant },
    Wallclock { high_water: AtomicU64 },
}

impl Clock {
    /// Monotonic clock anchored at construction. Preferred source.
    pub fn monotonic() -> Self {
        Self {
            source: Source::Monotonic {
                origin: Instant::now(),
            },
        }
    }

    /// Wall-clock fallback with regression clamping.
    ///
    /// Readings are microseconds since the Unix epoch, forced non-decreasing:
    /// a backwards jump is reported via `warn!` and the interval it would
    /// have produced collapses to zero.
    pub fn wallclock() -> Self {
        Self {
            source: Source::Wallclock {
                high_water: AtomicU64::new(0),
            },
        }
    }

    /// Current timestamp in microseconds. Non-decreasing across calls.
    #[inline]
    pub fn now_micros(&self) -> u64 {
        match &self.source {
            Source::Monotonic { origin } => origin.elapsed().as_micros() as u64,
            Source::Wallclock { high_water } => {
                let raw = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_micros() as u64)
                    .unwrap_or(0);
                clamped(high_water, raw)
            }
        }
    }

    /// Source name for diagnostics.
    pub fn name(&self) -> &'static str {
        match &self.source {
            Source::Monotonic { .. } => "monotonic",
            Source::Wallclock { .. } => "wallclock",
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::monotonic()
    }
}

/// Clamp a raw wall-clock reading against the high-water mark.
///
/// Returns the raw value when time moved forward, the previous reading when
/// it moved backwards. The regression itself is a measurement fault and is
/// logged; the clamp only guarantees callers never observe it as a negative
/// interval.
fn clamped(high_water: &AtomicU64, raw: u64) -> u64 {
    let prev = high_water.fetch_max(raw, Ordering::Relaxed);
    if raw < prev {
        warn!(
            "wall clock moved backwards ({} -> {} us); clamping to previous reading",
            prev, raw
        );
        prev
    } else {
        raw
    }
}
