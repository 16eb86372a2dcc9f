//! Recoverable error types shared across the workspace.
//!
//! Only failures a caller can act on live here. Misuse of a primitive is
//! not an error value; it goes through [`crate::contract`].

use std::error::Error;
use std::fmt;

/// Errors from sizing or allocating an opaque heap block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested alignment is not a power of two.
    InvalidAlignment {
        /// The alignment that was requested.
        align: usize,
    },
    /// The size rounded up to the alignment does not fit in `isize`.
    LayoutOverflow {
        /// Number of bytes requested.
        size: usize,
        /// Effective alignment after raising to the configured minimum.
        align: usize,
    },
    /// The allocator could not satisfy the request.
    OutOfMemory {
        /// Number of bytes requested.
        size: usize,
        /// Effective alignment after raising to the configured minimum.
        align: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAlignment { align } => {
                write!(f, "alignment {align} is not a power of two")
            }
            Self::LayoutOverflow { size, align } => {
                write!(f, "layout overflow: {size} bytes at alignment {align}")
            }
            Self::OutOfMemory { size, align } => {
                write!(
                    f,
                    "out of memory: could not allocate {size} bytes at alignment {align}"
                )
            }
        }
    }
}

impl Error for AllocError {}
