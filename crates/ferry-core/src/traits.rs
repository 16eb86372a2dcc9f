//! Compile-time capability table for bridged types.
//!
//! Generated bindings implement [`Bridged`] for every type that crosses the
//! boundary. The associated constants answer, once and statically, which
//! marshaling strategy applies: direct layout, a boxed opaque block, or a
//! retain/release wrapper. Nothing here branches at runtime.

use std::ffi::c_void;
use std::ptr::NonNull;

/// The foreign `Int` type.
pub type Int = isize;

/// The foreign `UInt` type.
pub type UInt = usize;

/// Larger of two sizes, usable in constant position.
pub const fn max_size(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

/// Capability query for a type that crosses the boundary.
///
/// Every flag defaults to `false`; implementors override only the ones that
/// hold for their type.
pub trait Bridged {
    /// The type is a foreign value type (copied, never shared).
    const IS_VALUE_TYPE: bool = false;

    /// The type's layout is resilient and lives in a boxed opaque block.
    const IS_OPAQUE_LAYOUT: bool = false;

    /// The type is a foreign reference-counted class.
    const IS_REF_COUNTED: bool = false;

    /// The type may be passed as a generic argument across the boundary.
    const IS_USABLE_IN_GENERIC_CONTEXT: bool = false;

    /// The type is a host record that was bridged into the foreign language.
    const IS_BRIDGED_CXX_RECORD: bool = false;

    /// Address the foreign side should read this value from.
    ///
    /// For direct-layout types this is the value itself; opaque-layout types
    /// return their heap block.
    fn opaque_pointer(&self) -> *const u8 {
        (self as *const Self).cast()
    }

    /// Mutable counterpart of [`Bridged::opaque_pointer`].
    fn opaque_pointer_mut(&mut self) -> *mut u8 {
        (self as *mut Self).cast()
    }
}

/// Supplies the foreign runtime's metadata record for a bridged type.
pub trait TypeMetadata {
    /// Pointer to the type's metadata in foreign-runtime memory.
    fn type_metadata() -> NonNull<c_void>;
}

/// Names the implementation-accessor type for a bridged type.
///
/// The accessor grants generated code access to internals (raw pointers,
/// pointer slots) that the public API does not expose.
pub trait ImplClassFor {
    /// The accessor type.
    type Impl;
}

/// Address the foreign side should read `value` from.
pub fn opaque_pointer<T: Bridged + ?Sized>(value: &T) -> *const u8 {
    value.opaque_pointer()
}

/// Mutable address the foreign side should write `value` through.
pub fn opaque_pointer_mut<T: Bridged + ?Sized>(value: &mut T) -> *mut u8 {
    value.opaque_pointer_mut()
}

macro_rules! bridged_builtin {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Bridged for $ty {
                const IS_VALUE_TYPE: bool = true;
                const IS_USABLE_IN_GENERIC_CONTEXT: bool = true;
            }
        )*
    };
}

bridged_builtin!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize, f32, f64, bool);

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain {
        _x: u32,
    }

    impl Bridged for Plain {}

    struct Boxed {
        block: [u8; 8],
    }

    impl Bridged for Boxed {
        const IS_OPAQUE_LAYOUT: bool = true;

        fn opaque_pointer(&self) -> *const u8 {
            self.block.as_ptr()
        }

        fn opaque_pointer_mut(&mut self) -> *mut u8 {
            self.block.as_mut_ptr()
        }
    }

    #[test]
    fn flags_default_to_false() {
        assert!(!Plain::IS_VALUE_TYPE);
        assert!(!Plain::IS_OPAQUE_LAYOUT);
        assert!(!Plain::IS_REF_COUNTED);
        assert!(!Plain::IS_USABLE_IN_GENERIC_CONTEXT);
        assert!(!Plain::IS_BRIDGED_CXX_RECORD);
    }

    #[test]
    fn builtins_are_generic_value_types() {
        assert!(i32::IS_VALUE_TYPE);
        assert!(Int::IS_USABLE_IN_GENERIC_CONTEXT);
        assert!(UInt::IS_USABLE_IN_GENERIC_CONTEXT);
        assert!(!f64::IS_OPAQUE_LAYOUT);
    }

    #[test]
    fn direct_layout_pointer_is_value_address() {
        let p = Plain { _x: 7 };
        assert_eq!(opaque_pointer(&p), (&p as *const Plain).cast());
    }

    #[test]
    fn opaque_layout_pointer_is_overridden() {
        let mut b = Boxed { block: [0; 8] };
        let expected = b.block.as_ptr();
        assert_eq!(opaque_pointer(&b), expected);
        assert_eq!(opaque_pointer_mut(&mut b).cast_const(), expected);
    }

    #[test]
    fn max_size_is_const() {
        const M: usize = max_size(3, 9);
        assert_eq!(M, 9);
        assert_eq!(max_size(4, 4), 4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn max_size_is_an_upper_bound_from_its_inputs(a in any::<usize>(), b in any::<usize>()) {
                let m = max_size(a, b);
                prop_assert!(m >= a && m >= b);
                prop_assert!(m == a || m == b);
                prop_assert_eq!(m, max_size(b, a));
            }
        }
    }
}
