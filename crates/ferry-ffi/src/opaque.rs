//! Opaque box lifecycle FFI: create, pointer, destroy.
//!
//! Boxes live in a global [`HandleTable`] behind a `Mutex`; C code only
//! ever sees `u64` handles. The table lock is held for the lookup alone,
//! and a destroyed box is freed after the lock is released.

use std::sync::Mutex;

use ferry_alloc::OpaqueStorage;

use crate::handle::HandleTable;
use crate::status::FerryStatus;

static BOXES: Mutex<HandleTable<OpaqueStorage>> = Mutex::new(HandleTable::new());

/// Allocate an opaque block of `size` bytes aligned to at least `align`.
///
/// An `align` of zero means pointer alignment. On success writes the box
/// handle to `handle_out` and returns `FERRY_STATUS_OK`; on allocation
/// failure nothing is written and the matching error status is returned.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ferry_opaque_create(size: usize, align: usize, handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return FerryStatus::InvalidArgument as i32;
        }
        let storage = match OpaqueStorage::try_new(size, align) {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!(error = %e, size, align, "opaque box allocation failed");
                return FerryStatus::from(&e) as i32;
            }
        };
        let handle = ffi_lock!(BOXES).insert(storage);
        // SAFETY: handle_out is non-null and valid per caller contract.
        unsafe { *handle_out = handle };
        FerryStatus::Ok as i32
    })
}

/// Write the block address of box `handle` to `ptr_out`.
///
/// The address stays valid until the box is destroyed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ferry_opaque_pointer(handle: u64, ptr_out: *mut *mut u8) -> i32 {
    ffi_guard!({
        if ptr_out.is_null() {
            return FerryStatus::InvalidArgument as i32;
        }
        let mut boxes = ffi_lock!(BOXES);
        let Some(storage) = boxes.get_mut(handle) else {
            return FerryStatus::InvalidHandle as i32;
        };
        let ptr = storage.as_mut_ptr();
        // SAFETY: ptr_out is non-null and valid per caller contract.
        unsafe { *ptr_out = ptr };
        FerryStatus::Ok as i32
    })
}

/// Free box `handle`. Destroying a stale handle returns `INVALID_HANDLE`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ferry_opaque_destroy(handle: u64) -> i32 {
    ffi_guard!({
        let removed = ffi_lock!(BOXES).remove(handle);
        match removed {
            Some(storage) => {
                drop(storage);
                FerryStatus::Ok as i32
            }
            None => FerryStatus::InvalidHandle as i32,
        }
    })
}

/// Number of live boxes, for leak checks in host test suites.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ferry_opaque_live_count(count_out: *mut usize) -> i32 {
    ffi_guard!({
        if count_out.is_null() {
            return FerryStatus::InvalidArgument as i32;
        }
        let live = ffi_lock!(BOXES).len();
        // SAFETY: count_out is non-null and valid per caller contract.
        unsafe { *count_out = live };
        FerryStatus::Ok as i32
    })
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    fn create(size: usize, align: usize) -> u64 {
        let mut handle = 0u64;
        assert_eq!(
            ferry_opaque_create(size, align, &mut handle),
            FerryStatus::Ok as i32
        );
        handle
    }

    fn pointer(handle: u64) -> *mut u8 {
        let mut ptr = std::ptr::null_mut();
        assert_eq!(
            ferry_opaque_pointer(handle, &mut ptr),
            FerryStatus::Ok as i32
        );
        ptr
    }

    #[test]
    fn create_pointer_destroy() {
        let h = create(96, 32);
        let p = pointer(h);
        assert_eq!(p as usize % 32, 0);
        // SAFETY: the block holds 96 bytes until destroyed below.
        unsafe {
            p.write_bytes(0x5A, 96);
            assert_eq!(*p.add(95), 0x5A);
        }
        assert_eq!(ferry_opaque_destroy(h), FerryStatus::Ok as i32);
    }

    #[test]
    fn pointer_is_stable_across_lookups() {
        let h = create(8, 8);
        assert_eq!(pointer(h), pointer(h));
        ferry_opaque_destroy(h);
    }

    #[test]
    fn double_destroy_is_invalid_handle() {
        let h = create(8, 8);
        assert_eq!(ferry_opaque_destroy(h), FerryStatus::Ok as i32);
        assert_eq!(ferry_opaque_destroy(h), FerryStatus::InvalidHandle as i32);
    }

    #[test]
    fn stale_handle_pointer_is_invalid_handle() {
        let h = create(8, 8);
        ferry_opaque_destroy(h);
        let mut ptr = std::ptr::null_mut();
        assert_eq!(
            ferry_opaque_pointer(h, &mut ptr),
            FerryStatus::InvalidHandle as i32
        );
        assert!(ptr.is_null());
    }

    #[test]
    fn null_out_pointers_rejected() {
        assert_eq!(
            ferry_opaque_create(8, 8, std::ptr::null_mut()),
            FerryStatus::InvalidArgument as i32
        );
        let h = create(8, 8);
        assert_eq!(
            ferry_opaque_pointer(h, std::ptr::null_mut()),
            FerryStatus::InvalidArgument as i32
        );
        assert_eq!(
            ferry_opaque_live_count(std::ptr::null_mut()),
            FerryStatus::InvalidArgument as i32
        );
        ferry_opaque_destroy(h);
    }

    #[test]
    fn bad_alignment_reported() {
        let mut handle = 0u64;
        assert_eq!(
            ferry_opaque_create(8, 6, &mut handle),
            FerryStatus::InvalidAlignment as i32
        );
        assert_eq!(handle, 0);
    }

    #[test]
    fn overflowing_size_reported() {
        let mut handle = 0u64;
        assert_eq!(
            ferry_opaque_create(usize::MAX, 64, &mut handle),
            FerryStatus::LayoutOverflow as i32
        );
    }

    #[test]
    fn live_count_reports_at_least_own_boxes() {
        let h = create(8, 8);
        let mut live = 0usize;
        assert_eq!(ferry_opaque_live_count(&mut live), FerryStatus::Ok as i32);
        assert!(live >= 1);
        ferry_opaque_destroy(h);
    }
}
