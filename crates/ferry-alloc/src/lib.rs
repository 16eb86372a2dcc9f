//! Aligned opaque heap blocks for Ferry.
//!
//! A foreign value with resilient layout has a size and alignment that are
//! known when the bindings are generated, but no field layout the host may
//! rely on. Such values live in an [`OpaqueStorage`]: one exclusively owned,
//! suitably aligned heap block that generated accessor code reads and writes
//! through a raw pointer.
//!
//! # Architecture
//!
//! ```text
//! opaque_value! { struct Point { size, align } }   (generated wrapper)
//! └── OpaqueStorage<A>                             (single owner, no Clone)
//!     └── A: OpaqueAllocator                       (raw.rs, System by default)
//!         └── normalize_layout(size, align, &AllocConfig)
//! ```
//!
//! This crate is one of the few that may contain `unsafe` code; all of it
//! lives in `raw.rs` and the `Drop`/`Send` impls of [`OpaqueStorage`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod opaque;
pub mod raw;

pub use config::AllocConfig;
pub use ferry_core::AllocError;
pub use opaque::OpaqueStorage;
pub use raw::{normalize_layout, OpaqueAllocator, System};

#[doc(hidden)]
pub mod __private {
    pub use ferry_core::traits::Bridged;
}

/// Declare a named opaque value type backed by an [`OpaqueStorage`].
///
/// This is the shape generated bindings emit for a resilient struct: the
/// size and alignment are fixed at generation time, the contents are only
/// touched through [`Bridged::opaque_pointer`](ferry_core::Bridged::opaque_pointer).
///
/// ```
/// ferry_alloc::opaque_value! {
///     /// A resilient 3-vector.
///     pub struct Vector3 { size: 24, align: 8 }
/// }
///
/// let v = Vector3::allocate().unwrap();
/// assert_eq!(Vector3::SIZE, 24);
/// assert!(!v.storage().is_absent());
/// ```
#[macro_export]
macro_rules! opaque_value {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { size: $size:expr, align: $align:expr $(,)? }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            storage: $crate::OpaqueStorage,
        }

        impl $name {
            /// Size of the foreign value in bytes.
            pub const SIZE: usize = $size;

            /// Alignment of the foreign value in bytes.
            pub const ALIGN: usize = $align;

            /// Allocate an uninitialised block for the value.
            ///
            /// The foreign initializer must write the value through
            /// `opaque_pointer_mut` before it is read.
            pub fn allocate() -> ::std::result::Result<Self, $crate::AllocError> {
                ::std::result::Result::Ok(Self {
                    storage: $crate::OpaqueStorage::try_new(Self::SIZE, Self::ALIGN)?,
                })
            }

            /// Allocate a zero-filled block for the value.
            pub fn zeroed() -> ::std::result::Result<Self, $crate::AllocError> {
                let config = $crate::AllocConfig {
                    zero_init: true,
                    ..$crate::AllocConfig::default()
                };
                ::std::result::Result::Ok(Self {
                    storage: $crate::OpaqueStorage::try_new_in(
                        Self::SIZE,
                        Self::ALIGN,
                        &config,
                        $crate::System,
                    )?,
                })
            }

            /// The backing storage.
            pub fn storage(&self) -> &$crate::OpaqueStorage {
                &self.storage
            }

            /// Consume the value, returning its backing storage.
            pub fn into_storage(self) -> $crate::OpaqueStorage {
                self.storage
            }
        }

        impl $crate::__private::Bridged for $name {
            const IS_VALUE_TYPE: bool = true;
            const IS_OPAQUE_LAYOUT: bool = true;

            fn opaque_pointer(&self) -> *const u8 {
                self.storage.as_ptr()
            }

            fn opaque_pointer_mut(&mut self) -> *mut u8 {
                self.storage.as_mut_ptr()
            }
        }
    };
}
