//! Process-wide knobs (spec.md §5, §6.1).
//!
//! Every generative loop in this crate is bounded by one of these so that
//! a misbehaving predicate or a deeply recursive spec fails fast instead
//! of hanging. Stored as atomics rather than behind a lock, matching the
//! "no lock held across a user predicate call" rule §5 applies to the
//! registry too.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Default number of generative trials `fspec`'s `conform` runs.
pub const DEFAULT_FSPEC_ITERATIONS: usize = 21;
/// Default number of elements `every` samples in sampling mode.
pub const DEFAULT_COLL_CHECK_LIMIT: usize = 101;
/// Default number of problems `every` reports before stopping.
pub const DEFAULT_COLL_ERROR_LIMIT: usize = 20;
/// Default cap on same-`id` re-entries before recursive `Alt`/`Rep`
/// branches are pruned during generation.
pub const DEFAULT_RECURSION_LIMIT: usize = 4;
/// Default cap on generated collection size absent an explicit `gen_max`.
pub const DEFAULT_GEN_MAX: usize = 20;

static CHECK_ASSERTS: AtomicBool = AtomicBool::new(false);
static RECURSION_LIMIT: AtomicUsize = AtomicUsize::new(DEFAULT_RECURSION_LIMIT);
static FSPEC_ITERATIONS: AtomicUsize = AtomicUsize::new(DEFAULT_FSPEC_ITERATIONS);
static COLL_CHECK_LIMIT: AtomicUsize = AtomicUsize::new(DEFAULT_COLL_CHECK_LIMIT);
static COLL_ERROR_LIMIT: AtomicUsize = AtomicUsize::new(DEFAULT_COLL_ERROR_LIMIT);

pub fn check_asserts() -> bool {
    CHECK_ASSERTS.load(Ordering::Relaxed)
}

pub fn set_check_asserts(v: bool) {
    CHECK_ASSERTS.store(v, Ordering::Relaxed);
}

pub fn recursion_limit() -> usize {
    RECURSION_LIMIT.load(Ordering::Relaxed)
}

pub fn set_recursion_limit(v: usize) {
    RECURSION_LIMIT.store(v, Ordering::Relaxed);
}

pub fn fspec_iterations() -> usize {
    FSPEC_ITERATIONS.load(Ordering::Relaxed)
}

pub fn set_fspec_iterations(v: usize) {
    FSPEC_ITERATIONS.store(v, Ordering::Relaxed);
}

pub fn coll_check_limit() -> usize {
    COLL_CHECK_LIMIT.load(Ordering::Relaxed)
}

pub fn set_coll_check_limit(v: usize) {
    COLL_CHECK_LIMIT.store(v, Ordering::Relaxed);
}

pub fn coll_error_limit() -> usize {
    COLL_ERROR_LIMIT.load(Ordering::Relaxed)
}

pub fn set_coll_error_limit(v: usize) {
    COLL_ERROR_LIMIT.store(v, Ordering::Relaxed);
}
