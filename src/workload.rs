//! Dependent-cycle workloads.
//!
//! Both loops execute chains of XOR updates over five scratch variables,
//! each variable updated from exactly one other so the chain is cyclic and
//! strictly serial: the CPU cannot issue two updates in parallel or retire
//! them out of order. Every update is routed through [`black_box`], so the
//! optimizer can neither prove the loop side-effect-free nor collapse the
//! dependency chain.
//!
//! The per-iteration operation counts are fixed at compile time:
//! [`run_short`] executes [`OPS_PER_ITER_SHORT`] operations per iteration and
//! [`run_long`] executes [`OPS_PER_ITER_LONG`], so for any shared iteration
//! count the executed totals differ by exactly `n` times [`CYCLE_DELTA`]. The
//! driver subtracts one measurement from the other, cancelling call, loop
//! and timer-read overhead; only the marginal cycles remain.
//!
//! [`OPS_PER_ITER_SHORT`]: crate::OPS_PER_ITER_SHORT
//! [`OPS_PER_ITER_LONG`]: crate::OPS_PER_ITER_LONG
//! [`CYCLE_DELTA`]: crate::CYCLE_DELTA

use std::hint::black_box;

#[cfg(test)]
use std::cell::Cell;

#[cfg(test)]
thread_local! {
    /// Elementary operations executed on this thread (test instrumentation).
    static OP_COUNT: Cell<u64> = const { Cell::new(0) };
}

/// One elementary dependent operation: XOR-update `dst` from `src`, then
/// force the result opaque so the next step genuinely depends on it.
macro_rules! step {
    ($dst:ident, $src:ident) => {{
        #[cfg(test)]
        OP_COUNT.with(|ops| ops.set(ops.get() + 1));
        $dst = black_box($dst ^ $src);
    }};
}

/// Five operations around the full dependency cycle a->b->c->d->e.
macro_rules! run5 {
    ($a:ident, $b:ident, $c:ident, $d:ident, $e:ident) => {{
        step!($a, $e);
        step!($b, $a);
        step!($c, $b);
        step!($d, $c);
        step!($e, $d);
    }};
}

macro_rules! run10 {
    ($a:ident, $b:ident, $c:ident, $d:ident, $e:ident) => {{
        run5!($a, $b, $c, $d, $e);
        run5!($a, $b, $c, $d, $e);
    }};
}

macro_rules! run50 {
    ($a:ident, $b:ident, $c:ident, $d:ident, $e:ident) => {{
        run10!($a, $b, $c, $d, $e);
        run10!($a, $b, $c, $d, $e);
        run10!($a, $b, $c, $d, $e);
        run10!($a, $b, $c, $d, $e);
        run10!($a, $b, $c, $d, $e);
    }};
}

macro_rules! run100 {
    ($a:ident, $b:ident, $c:ident, $d:ident, $e:ident) => {{
        run50!($a, $b, $c, $d, $e);
        run50!($a, $b, $c, $d, $e);
    }};
}

/// Execute `n * 50` serially-dependent operations.
///
/// Opaque to the caller: `#[inline(never)]` keeps the call overhead
/// consistent and prevents the driver's loop from being fused with the
/// workload.
///
/// # Panics
///
/// Panics if `n` is zero. The driver always seeds from a positive count and
/// only grows it.
#[inline(never)]
pub fn run_short(n: u64) {
    assert!(n >= 1, "iteration count must be at least 1");
    let (mut a, mut b, mut c, mut d, mut e) = (0u32, 0u32, 0u32, 0u32, 0u32);
    for _ in 0..n {
        run50!(a, b, c, d, e);
    }
    black_box((a, b, c, d, e));
}

/// Execute `n * 250` serially-dependent operations.
///
/// Structurally identical to [`run_short`]; the extra 200 operations per
/// iteration are the measured quantity. The unrolled body stays small enough
/// to fit comfortably in tiny L1 instruction caches.
///
/// # Panics
///
/// Panics if `n` is zero.
#[inline(never)]
pub fn run_long(n: u64) {
    assert!(n >= 1, "iteration count must be at least 1");
    let (mut a, mut b, mut c, mut d, mut e) = (0u32, 0u32, 0u32, 0u32, 0u32);
    for _ in 0..n {
        run50!(a, b, c, d, e);
        run100!(a, b, c, d, e);
        run100!(a, b, c, d, e);
    }
    black_box((a, b, c, d, e));
}
