//! Foreign reference-counted handles for Ferry.
//!
//! A foreign class instance is owned by the foreign runtime and kept alive
//! by intrusive reference counting. [`RefCounted`] maps that onto Rust
//! ownership: each live handle holds exactly one retain credit, `Clone`
//! retains, `Drop` releases. Shared ownership of the object means several
//! handles, each with its own credit, never one credit aliased.
//!
//! The runtime's retain/release entry points are supplied through the
//! [`ForeignRuntime`] trait so the handle works against the real runtime
//! and against instrumented doubles alike.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod access;
pub mod handle;
pub mod runtime;

pub use access::ImplRefCounted;
pub use handle::RefCounted;
pub use runtime::ForeignRuntime;
