//! Benchmark support for the Ferry interop runtime.
//!
//! Provides a minimal foreign runtime whose retain and release cost one
//! atomic operation each, so handle benchmarks measure the handle and not
//! an instrumented double, plus the block shapes used by the opaque
//! storage benchmarks.

#![deny(missing_docs)]
#![deny(unsafe_code)]

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{fence, AtomicUsize, Ordering};

use ferry_refcount::{ForeignRuntime, RefCounted};

/// `(size, align)` pairs covering typical resilient value layouts.
pub const BLOCK_SHAPES: &[(usize, usize)] = &[(8, 8), (24, 8), (64, 16), (256, 64), (4096, 4096)];

/// Foreign runtime backed by a boxed atomic counter.
pub enum BenchRuntime {}

// SAFETY: the counter follows the `Arc` ordering discipline and the box is
// freed exactly once, by the release that drops the count to zero.
#[allow(unsafe_code)]
unsafe impl ForeignRuntime for BenchRuntime {
    unsafe fn retain(object: NonNull<c_void>) -> NonNull<c_void> {
        // SAFETY: the caller holds a credit, so the box is live.
        let count = unsafe { object.cast::<AtomicUsize>().as_ref() };
        count.fetch_add(1, Ordering::Relaxed);
        object
    }

    unsafe fn release(object: NonNull<c_void>) {
        // SAFETY: the caller holds a credit, so the box is live.
        let count = unsafe { object.cast::<AtomicUsize>().as_ref() };
        if count.fetch_sub(1, Ordering::Release) == 1 {
            fence(Ordering::Acquire);
            // SAFETY: the pointer came from `Box::into_raw` in `bench_object`.
            drop(unsafe { Box::from_raw(object.cast::<AtomicUsize>().as_ptr()) });
        }
    }
}

/// A fresh object holding one credit, owned by the returned handle.
pub fn bench_object() -> RefCounted<BenchRuntime> {
    let raw = Box::into_raw(Box::new(AtomicUsize::new(1)));
    // SAFETY: `Box::into_raw` never returns null, and the handle adopts the
    // object's only credit.
    #[allow(unsafe_code)]
    let handle = unsafe { RefCounted::from_retained(NonNull::new_unchecked(raw).cast()) };
    handle
}
