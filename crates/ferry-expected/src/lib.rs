//! Tagged value-or-foreign-error results for Ferry.
//!
//! A foreign function that can throw returns either its value or an error
//! object. [`Expected`] carries exactly one of the two inline, selected by
//! its variant, and enforces the "check before you read" rule with the
//! fatal contract channel instead of returning an `Option`: reading the
//! wrong payload is a bug in the caller, not a condition to recover from.
//!
//! Propagating the error is the caller's job, typically through
//! [`Expected::into_result`] and `?`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod expected;

pub use error::ForeignError;
pub use expected::Expected;
