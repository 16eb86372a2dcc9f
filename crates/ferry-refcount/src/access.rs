//! Implementation accessor for [`RefCounted`].
//!
//! Generated code sometimes has to move raw pointers in and out of a
//! handle without going through `Clone`/`Drop`, for example when passing
//! `self` to a foreign method or swapping in a freshly returned object.
//! These functions are that restricted capability; application code should
//! never need them.

use std::ffi::c_void;
use std::ptr::NonNull;

use ferry_core::contract::{violate, Violation};

use crate::handle::RefCounted;
use crate::runtime::ForeignRuntime;

/// Raw-pointer access to a [`RefCounted`] for generated bindings.
#[derive(Debug)]
pub enum ImplRefCounted {}

impl ImplRefCounted {
    /// Read the raw pointer without retaining.
    ///
    /// The pointer is only valid while `object` holds its credit.
    pub fn opaque_pointer<R: ForeignRuntime>(object: &RefCounted<R>) -> NonNull<c_void> {
        object.live_ptr()
    }

    /// Mutable access to the handle's pointer slot.
    ///
    /// # Safety
    ///
    /// Whatever is left in the slot when the borrow ends must be a pointer
    /// on which the handle owns exactly one credit; the caller is
    /// responsible for any retain/release this requires.
    #[allow(unsafe_code)]
    pub unsafe fn opaque_pointer_slot<R: ForeignRuntime>(
        object: &mut RefCounted<R>,
    ) -> &mut NonNull<c_void> {
        match object.ptr.as_mut() {
            Some(slot) => slot,
            None => violate(Violation::VacatedHandle {
                type_name: std::any::type_name::<RefCounted<R>>(),
            }),
        }
    }

    /// Retain and return the raw pointer.
    ///
    /// The caller owns the new credit and must release it exactly once,
    /// either directly or by adopting it into another handle.
    #[allow(unsafe_code)]
    pub fn copy_opaque_pointer<R: ForeignRuntime>(object: &RefCounted<R>) -> NonNull<c_void> {
        let ptr = object.live_ptr();
        // SAFETY: `object` holds a credit, so the object is live.
        unsafe { R::retain(ptr) };
        ptr
    }
}
