//! The reference-counted handle.
//!
//! Credit accounting:
//!
//! | operation                    | retain | release |
//! |------------------------------|--------|---------|
//! | `from_retained`              | 0      | 0       |
//! | `clone`                      | 1      | 0       |
//! | `clone_from`                 | 1      | 1 (old) |
//! | move / `take` / `into_raw`   | 0      | 0       |
//! | `drop` (live handle)         | 0      | 1       |
//! | `drop` (vacated handle)      | 0      | 0       |

use std::any::type_name;
use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use ferry_core::contract::{violate, Violation};
use ferry_core::traits::{Bridged, ImplClassFor};

use crate::access::ImplRefCounted;
use crate::runtime::ForeignRuntime;

/// One retain credit on a foreign reference-counted object.
///
/// Rust moves relocate the credit without touching the count. A handle
/// that has given its credit away with [`take`](Self::take) is *vacated*:
/// dropping it does nothing and any other use is a contract violation.
pub struct RefCounted<R: ForeignRuntime> {
    pub(crate) ptr: Option<NonNull<c_void>>,
    _runtime: PhantomData<fn() -> R>,
}

impl<R: ForeignRuntime> RefCounted<R> {
    /// Adopt a credit the caller already owns. Does not retain.
    ///
    /// # Safety
    ///
    /// `object` must point to a live foreign object managed by `R`, and the
    /// caller must own one credit on it which is transferred to the handle.
    #[allow(unsafe_code)]
    pub unsafe fn from_retained(object: NonNull<c_void>) -> Self {
        Self {
            ptr: Some(object),
            _runtime: PhantomData,
        }
    }

    /// Adopt a credit from a raw pointer as returned across the boundary.
    ///
    /// A null pointer raises [`Violation::NullForeignPointer`].
    ///
    /// # Safety
    ///
    /// Same as [`from_retained`](Self::from_retained) for non-null `object`.
    #[allow(unsafe_code)]
    pub unsafe fn from_retained_ptr(object: *mut c_void) -> Self {
        match NonNull::new(object) {
            // SAFETY: forwarded caller contract.
            Some(object) => unsafe { Self::from_retained(object) },
            None => violate(Violation::NullForeignPointer),
        }
    }

    /// Move the credit out of a place that is only mutably borrowed.
    ///
    /// `self` is left vacated. No retain or release happens.
    pub fn take(&mut self) -> Self {
        let object = self.live_ptr();
        self.ptr = None;
        Self {
            ptr: Some(object),
            _runtime: PhantomData,
        }
    }

    /// Give the credit to the caller, who becomes responsible for one release.
    pub fn into_raw(self) -> NonNull<c_void> {
        let object = self.live_ptr();
        std::mem::forget(self);
        object
    }

    /// Whether the credit was moved out with [`take`](Self::take).
    pub fn is_vacated(&self) -> bool {
        self.ptr.is_none()
    }

    /// Whether both handles refer to the same foreign object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.live_ptr() == other.live_ptr()
    }

    pub(crate) fn live_ptr(&self) -> NonNull<c_void> {
        match self.ptr {
            Some(object) => object,
            None => violate(Violation::VacatedHandle {
                type_name: type_name::<Self>(),
            }),
        }
    }
}

impl<R: ForeignRuntime> Clone for RefCounted<R> {
    #[allow(unsafe_code)]
    fn clone(&self) -> Self {
        let object = self.live_ptr();
        // SAFETY: `self` holds a credit, so the object is live.
        unsafe { R::retain(object) };
        Self {
            ptr: Some(object),
            _runtime: PhantomData,
        }
    }

    /// Retains `source`'s object before releasing the old credit, so the
    /// object survives even when both handles refer to it and the old
    /// credit was the last one the caller could see.
    #[allow(unsafe_code)]
    fn clone_from(&mut self, source: &Self) {
        let object = source.live_ptr();
        // SAFETY: `source` holds a credit, so the object is live.
        unsafe { R::retain(object) };
        if let Some(previous) = self.ptr.replace(object) {
            // SAFETY: `self` owned this credit and no longer refers to it.
            unsafe { R::release(previous) };
        }
    }
}

impl<R: ForeignRuntime> Drop for RefCounted<R> {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        if let Some(object) = self.ptr.take() {
            // SAFETY: a live handle owns exactly one credit.
            unsafe { R::release(object) };
        }
    }
}

impl<R: ForeignRuntime> fmt::Debug for RefCounted<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ptr {
            Some(object) => f.debug_tuple("RefCounted").field(&object).finish(),
            None => f.write_str("RefCounted(vacated)"),
        }
    }
}

impl<R: ForeignRuntime> Bridged for RefCounted<R> {
    const IS_REF_COUNTED: bool = true;
    const IS_USABLE_IN_GENERIC_CONTEXT: bool = true;
}

impl<R: ForeignRuntime> ImplClassFor for RefCounted<R> {
    type Impl = ImplRefCounted;
}

// SAFETY: `ForeignRuntime` requires retain/release to be thread-safe, and a
// handle carries no state besides the pointer.
#[allow(unsafe_code)]
unsafe impl<R: ForeignRuntime> Send for RefCounted<R> {}

// SAFETY: through `&RefCounted` only `clone` (a retain) reaches the runtime.
#[allow(unsafe_code)]
unsafe impl<R: ForeignRuntime> Sync for RefCounted<R> {}

#[cfg(test)]
#[allow(unsafe_code)]
pub(crate) mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};

    /// Leaked per-test counter block standing in for a foreign object.
    #[derive(Default)]
    pub(crate) struct Counts {
        pub(crate) credits: AtomicIsize,
        pub(crate) retains: AtomicUsize,
        pub(crate) releases: AtomicUsize,
    }

    pub(crate) enum TestRuntime {}

    unsafe impl ForeignRuntime for TestRuntime {
        unsafe fn retain(object: NonNull<c_void>) -> NonNull<c_void> {
            let counts = unsafe { object.cast::<Counts>().as_ref() };
            counts.retains.fetch_add(1, Ordering::Relaxed);
            counts.credits.fetch_add(1, Ordering::AcqRel);
            object
        }

        unsafe fn release(object: NonNull<c_void>) {
            let counts = unsafe { object.cast::<Counts>().as_ref() };
            counts.releases.fetch_add(1, Ordering::Relaxed);
            let previous = counts.credits.fetch_sub(1, Ordering::AcqRel);
            assert!(previous > 0, "released a credit that was never held");
        }
    }

    pub(crate) fn object() -> (RefCounted<TestRuntime>, &'static Counts) {
        let counts: &'static Counts = Box::leak(Box::default());
        counts.credits.store(1, Ordering::Relaxed);
        let ptr = NonNull::from(counts).cast::<c_void>();
        (unsafe { RefCounted::from_retained(ptr) }, counts)
    }

    fn tally(counts: &Counts) -> (isize, usize, usize) {
        (
            counts.credits.load(Ordering::Relaxed),
            counts.retains.load(Ordering::Relaxed),
            counts.releases.load(Ordering::Relaxed),
        )
    }

    fn panic_handler(violation: &Violation) -> ! {
        panic::panic_any(violation.clone())
    }

    #[test]
    fn adopt_does_not_retain() {
        let (h, counts) = object();
        assert_eq!(tally(counts), (1, 0, 0));
        drop(h);
        assert_eq!(tally(counts), (0, 0, 1));
    }

    #[test]
    fn clone_retains_once() {
        let (h, counts) = object();
        let c = h.clone();
        assert!(c.ptr_eq(&h));
        assert_eq!(tally(counts), (2, 1, 0));
        drop(c);
        drop(h);
        assert_eq!(tally(counts), (0, 1, 2));
    }

    #[test]
    fn clone_from_aliased_object_keeps_it_alive() {
        let (mut a, counts) = object();
        let b = a.clone();
        a.clone_from(&b);
        assert_eq!(tally(counts), (2, 2, 1));
        drop(b);
        drop(a);
        assert_eq!(tally(counts).0, 0);
    }

    #[test]
    fn clone_from_switches_objects() {
        let (mut a, first) = object();
        let (b, second) = object();
        a.clone_from(&b);
        assert!(a.ptr_eq(&b));
        assert_eq!(tally(first), (0, 0, 1));
        assert_eq!(tally(second), (2, 1, 0));
    }

    #[test]
    fn take_moves_credit_without_counting() {
        let (mut a, counts) = object();
        let b = a.take();
        assert!(a.is_vacated());
        assert!(!b.is_vacated());
        assert_eq!(tally(counts), (1, 0, 0));
        drop(a);
        assert_eq!(tally(counts), (1, 0, 0));
        drop(b);
        assert_eq!(tally(counts), (0, 0, 1));
    }

    #[test]
    fn into_raw_then_adopt_round_trips_credit() {
        let (a, counts) = object();
        let raw = a.into_raw();
        assert_eq!(tally(counts), (1, 0, 0));
        let back: RefCounted<TestRuntime> = unsafe { RefCounted::from_retained(raw) };
        drop(back);
        assert_eq!(tally(counts), (0, 0, 1));
    }

    #[test]
    fn clone_of_vacated_is_a_violation() {
        let (mut a, counts) = object();
        let b = a.take();
        let payload = panic::catch_unwind(AssertUnwindSafe(|| {
            ferry_core::contract::with_handler(panic_handler, || {
                let _ = a.clone();
            })
        }))
        .unwrap_err();
        assert!(matches!(
            payload.downcast_ref::<Violation>(),
            Some(Violation::VacatedHandle { .. })
        ));
        drop(b);
        assert_eq!(tally(counts), (0, 0, 1));
    }

    #[test]
    fn null_adopt_is_a_violation() {
        let payload = panic::catch_unwind(|| {
            ferry_core::contract::with_handler(panic_handler, || {
                let _ = unsafe { RefCounted::<TestRuntime>::from_retained_ptr(std::ptr::null_mut()) };
            })
        })
        .unwrap_err();
        assert_eq!(
            payload.downcast_ref::<Violation>(),
            Some(&Violation::NullForeignPointer)
        );
    }

    #[test]
    fn debug_marks_vacated() {
        let (mut a, _counts) = object();
        let _b = a.take();
        assert_eq!(format!("{a:?}"), "RefCounted(vacated)");
    }

    #[test]
    fn capability_flags() {
        assert!(<RefCounted<TestRuntime> as Bridged>::IS_REF_COUNTED);
        assert!(!<RefCounted<TestRuntime> as Bridged>::IS_OPAQUE_LAYOUT);
    }
}
