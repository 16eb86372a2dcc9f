//! Low-level primitives for opaque block allocation.
//!
//! Everything that touches the global allocator directly lives here. Each
//! `unsafe` block carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use ferry_core::AllocError;

use crate::config::AllocConfig;

/// Source of aligned heap blocks for [`OpaqueStorage`](crate::OpaqueStorage).
///
/// # Safety
///
/// A pointer returned by [`allocate`](Self::allocate) must be valid for
/// reads and writes of `layout.size()` bytes, aligned to `layout.align()`,
/// and must stay valid until it is passed back to
/// [`deallocate`](Self::deallocate) with the same layout.
pub unsafe trait OpaqueAllocator {
    /// Allocate a block for `layout`, or `None` if the request cannot be met.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Allocate a zero-filled block for `layout`.
    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        let block = self.allocate(layout)?;
        // SAFETY: the trait contract makes `block` valid for writes of
        // `layout.size()` bytes.
        unsafe { block.as_ptr().write_bytes(0, layout.size()) };
        Some(block)
    }

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// `block` must have come from `allocate` or `allocate_zeroed` on this
    /// allocator with the same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout);
}

/// The process-wide Rust allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct System;

// SAFETY: forwards to the global allocator, which upholds the contract for
// non-zero-sized layouts; zero-sized requests are refused.
unsafe impl OpaqueAllocator for System {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: `layout` has a non-zero size.
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: `layout` has a non-zero size.
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        // SAFETY: guaranteed by the caller.
        unsafe { alloc::dealloc(block.as_ptr(), layout) }
    }
}

/// Turn a requested size and alignment into the layout actually allocated.
///
/// The alignment is raised to `config.min_alignment`; an alignment of zero
/// means "no requirement". A zero size is rounded up to one byte so every
/// live block has a distinct address.
pub fn normalize_layout(
    size: usize,
    align: usize,
    config: &AllocConfig,
) -> Result<Layout, AllocError> {
    config.validate()?;
    if align != 0 && !align.is_power_of_two() {
        return Err(AllocError::InvalidAlignment { align });
    }
    let align = align.max(config.min_alignment);
    Layout::from_size_align(size.max(1), align)
        .map_err(|_| AllocError::LayoutOverflow { size, align })
}
