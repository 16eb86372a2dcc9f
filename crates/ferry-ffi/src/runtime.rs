//! Binding to the linked Swift runtime's reference counting.
//!
//! Only built with the `swift-runtime` feature: the symbols resolve at link
//! time against `libswiftCore`.

use std::ffi::c_void;
use std::ptr::NonNull;

use ferry_refcount::ForeignRuntime;

#[allow(unsafe_code)]
extern "C" {
    fn swift_retain(object: *mut c_void) -> *mut c_void;
    fn swift_release(object: *mut c_void);
}

/// The Swift runtime, for `RefCounted<SwiftRuntime>` handles on Swift
/// class instances.
#[derive(Debug)]
pub enum SwiftRuntime {}

// SAFETY: swift_retain and swift_release are atomic and thread-safe, and
// swift_retain returns its argument.
#[allow(unsafe_code)]
unsafe impl ForeignRuntime for SwiftRuntime {
    unsafe fn retain(object: NonNull<c_void>) -> NonNull<c_void> {
        // SAFETY: `object` is a live Swift object per the caller contract.
        unsafe { swift_retain(object.as_ptr()) };
        object
    }

    unsafe fn release(object: NonNull<c_void>) {
        // SAFETY: the caller owns the credit being released.
        unsafe { swift_release(object.as_ptr()) }
    }
}
