//! Stack growth for deep recursion in the evaluator.
//!
//! Every user call re-enters `exec` and `eval`, so a script recursing up to
//! the call-depth limit can outrun a small thread stack. Wrapping those
//! entry points keeps the limit reachable as a catchable exception.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
