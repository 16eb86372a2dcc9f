//! Core types and traits for the Ferry interop runtime.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the pieces every other Ferry crate agrees on: the compile-time
//! capability table for bridged types, the shared allocation error, and
//! the fatal contract-violation channel used by the primitives.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod contract;
pub mod error;
pub mod traits;

pub use contract::{violate, Variant, Violation, ViolationHandler};
pub use error::AllocError;
pub use traits::{max_size, Bridged, ImplClassFor, Int, TypeMetadata, UInt};
