//! C-compatible status codes.
//!
//! [`FerryStatus`] is a `repr(i32)` enum covering every recoverable failure
//! of the exported functions. Contract violations are not statuses: they
//! abort before a status could be returned.

use ferry_core::AllocError;

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FerryStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// An out-pointer is null or an argument is otherwise unusable.
    InvalidArgument = -2,
    /// Requested alignment is not a power of two.
    InvalidAlignment = -3,
    /// Requested size overflows at the requested alignment.
    LayoutOverflow = -4,
    /// The allocator could not satisfy the request.
    OutOfMemory = -5,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&AllocError> for FerryStatus {
    fn from(e: &AllocError) -> Self {
        match e {
            AllocError::InvalidAlignment { .. } => FerryStatus::InvalidAlignment,
            AllocError::LayoutOverflow { .. } => FerryStatus::LayoutOverflow,
            AllocError::OutOfMemory { .. } => FerryStatus::OutOfMemory,
        }
    }
}
