//! Stack growth for recursive evaluation.
//!
//! Nested expressions, nested resource types and recursive user functions all
//! recurse on the native stack. On native targets the stack is grown on
//! demand; on wasm the closure is simply called.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 64 * 1024;

/// Size of each new stack segment.
const SEGMENT: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
