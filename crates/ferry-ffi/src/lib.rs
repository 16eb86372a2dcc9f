//! C ABI for the Ferry interop runtime.
//!
//! Exposes opaque-box lifetime management to generated C and C++ code
//! through generation-checked `u64` handles, and (with the
//! `swift-runtime` feature) binds [`ferry_refcount::ForeignRuntime`] to the
//! linked Swift runtime. Every exported function returns a
//! [`FerryStatus`] code and never unwinds across the boundary.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a Rust panic into [`FerryStatus::Panicked`].
///
/// The body runs inside a closure, so `return` leaves the body with a
/// status code rather than the enclosing function.
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(status) => status,
            Err(_) => {
                tracing::error!("panic caught at the FFI boundary");
                $crate::status::FerryStatus::Panicked as i32
            }
        }
    };
}

/// Lock a mutex inside [`ffi_guard!`], returning `Panicked` if poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::FerryStatus::Panicked as i32,
        }
    };
}

pub mod handle;
pub mod opaque;
#[cfg(feature = "swift-runtime")]
pub mod runtime;
pub mod status;

#[cfg(feature = "swift-runtime")]
pub use runtime::SwiftRuntime;
pub use status::FerryStatus;
