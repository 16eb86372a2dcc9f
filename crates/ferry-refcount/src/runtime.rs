//! The foreign runtime's reference-counting entry points.

use std::ffi::c_void;
use std::ptr::NonNull;

/// Retain and release functions of a foreign runtime.
///
/// Both are consumed, not reimplemented: the runtime owns the count.
///
/// # Safety
///
/// Implementors guarantee that `retain` and `release` are atomic and may
/// be called concurrently from any thread, that `retain` returns the
/// pointer it was given, and that an object is not deallocated while any
/// credit on it is outstanding.
#[allow(unsafe_code)]
pub unsafe trait ForeignRuntime: 'static {
    /// Add one credit to `object`.
    ///
    /// # Safety
    ///
    /// `object` must point to a live foreign object on which the caller
    /// holds at least one credit.
    unsafe fn retain(object: NonNull<c_void>) -> NonNull<c_void>;

    /// Drop one credit on `object`, possibly destroying it.
    ///
    /// # Safety
    ///
    /// The caller must own the credit being released and must not use it
    /// afterwards.
    unsafe fn release(object: NonNull<c_void>);
}
