//! Ferry: runtime support for generated bindings to a reference-counted
//! foreign language.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Ferry sub-crates. Generated binding code depends on `ferry` alone.
//!
//! Three primitives carry foreign values through host memory:
//!
//! - [`OpaqueStorage`]: one exclusively owned, aligned heap block for a
//!   value whose layout is resilient (size and alignment known, fields not).
//! - [`RefCounted`]: one retain credit on a foreign class instance;
//!   `Clone` retains, `Drop` releases.
//! - [`Expected`]: a value or a foreign error, inline, with fail-fast
//!   accessors.
//!
//! # Quick start
//!
//! ```rust
//! use ferry::prelude::*;
//! use ferry_test_utils::mock_object;
//!
//! // A foreign call returned an object with one credit.
//! let (object, probe) = mock_object();
//! let copy = object.clone();
//! assert_eq!(probe.credits(), 2);
//!
//! // ...and a throwing call succeeded.
//! let result: Expected<RefCounted<_>> = Expected::from_value(copy);
//! assert!(result.has_value());
//! drop(result);
//! drop(object);
//! assert!(probe.is_destroyed());
//!
//! // A resilient value lives in its own aligned block.
//! let block = OpaqueStorage::try_new(24, 8).unwrap();
//! assert_eq!(block.as_ptr() as usize % 8, 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ferry-core` | Capability traits, contract channel, `AllocError` |
//! | [`alloc`] | `ferry-alloc` | `OpaqueStorage`, allocators, `AllocConfig` |
//! | [`refcount`] | `ferry-refcount` | `RefCounted`, `ForeignRuntime`, `ImplRefCounted` |
//! | [`expected`] | `ferry-expected` | `Expected`, `ForeignError` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Capability traits, contract violations and shared errors (`ferry-core`).
pub use ferry_core as types;

/// Opaque heap blocks and their allocators (`ferry-alloc`).
pub use ferry_alloc as alloc;

/// Foreign reference-counted handles (`ferry-refcount`).
pub use ferry_refcount as refcount;

/// Value-or-foreign-error results (`ferry-expected`).
pub use ferry_expected as expected;

pub use ferry_alloc::{opaque_value, AllocConfig, OpaqueStorage};
pub use ferry_core::{AllocError, Bridged, Int, UInt, Violation};
pub use ferry_expected::{Expected, ForeignError};
pub use ferry_refcount::{ForeignRuntime, ImplRefCounted, RefCounted};

/// The names generated bindings use most.
pub mod prelude {
    pub use ferry_alloc::{OpaqueStorage, System};
    pub use ferry_core::traits::{Bridged, ImplClassFor, Int, TypeMetadata, UInt};
    pub use ferry_core::AllocError;
    pub use ferry_expected::{Expected, ForeignError};
    pub use ferry_refcount::{ForeignRuntime, ImplRefCounted, RefCounted};
}
