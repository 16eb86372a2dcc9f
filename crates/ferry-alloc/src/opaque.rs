//! Single-owner container for a foreign value with opaque layout.
//!
//! An [`OpaqueStorage`] owns at most one heap block. It is either *present*
//! (holding a block allocated with the layout requested at construction) or
//! *absent* (a transient placeholder, e.g. the source of a [`take`]).
//! There is no `Clone`: a duplicate needs a deep copy by code that knows the
//! real layout.
//!
//! [`take`]: OpaqueStorage::take

use std::alloc::Layout;
use std::fmt;
use std::mem;
use std::ptr::NonNull;

use ferry_core::contract::{violate, Violation};
use ferry_core::traits::Bridged;
use ferry_core::AllocError;

use crate::config::AllocConfig;
use crate::raw::{normalize_layout, OpaqueAllocator, System};

/// Exclusively owned, aligned heap block for an opaque foreign value.
pub struct OpaqueStorage<A: OpaqueAllocator = System> {
    storage: Option<NonNull<u8>>,
    layout: Layout,
    alloc: A,
}

impl OpaqueStorage {
    /// Allocate a block of `size` bytes aligned to at least `align` from the
    /// system allocator.
    ///
    /// The alignment is raised to pointer size if smaller. Allocation
    /// failure is returned as [`AllocError::OutOfMemory`].
    pub fn try_new(size: usize, align: usize) -> Result<Self, AllocError> {
        Self::try_new_in(size, align, &AllocConfig::default(), System)
    }

    /// An absent container backed by the system allocator.
    pub const fn empty() -> Self {
        Self::empty_in(System)
    }
}

impl<A: OpaqueAllocator> OpaqueStorage<A> {
    /// Allocate a block from `alloc` using `config`.
    pub fn try_new_in(
        size: usize,
        align: usize,
        config: &AllocConfig,
        alloc: A,
    ) -> Result<Self, AllocError> {
        let layout = normalize_layout(size, align, config)?;
        let block = if config.zero_init {
            alloc.allocate_zeroed(layout)
        } else {
            alloc.allocate(layout)
        };
        let Some(block) = block else {
            return Err(AllocError::OutOfMemory {
                size: layout.size(),
                align: layout.align(),
            });
        };
        tracing::trace!(
            ptr = ?block,
            size = layout.size(),
            align = layout.align(),
            "opaque block allocated"
        );
        Ok(Self {
            storage: Some(block),
            layout,
            alloc,
        })
    }

    /// An absent container that would free through `alloc`.
    pub const fn empty_in(alloc: A) -> Self {
        Self {
            storage: None,
            layout: Layout::new::<()>(),
            alloc,
        }
    }

    /// Whether the container holds no block.
    pub fn is_absent(&self) -> bool {
        self.storage.is_none()
    }

    /// Layout of the held block, or `None` if absent.
    pub fn layout(&self) -> Option<Layout> {
        self.storage.map(|_| self.layout)
    }

    /// Raw pointer to the block.
    ///
    /// Raises [`Violation::AbsentStorage`] if the container is absent.
    pub fn as_ptr(&self) -> *const u8 {
        match self.storage {
            Some(block) => block.as_ptr().cast_const(),
            None => violate(Violation::AbsentStorage),
        }
    }

    /// Mutable raw pointer to the block.
    ///
    /// Raises [`Violation::AbsentStorage`] if the container is absent.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        match self.storage {
            Some(block) => block.as_ptr(),
            None => violate(Violation::AbsentStorage),
        }
    }

    /// Move the block out into a new container, leaving `self` absent.
    ///
    /// No allocation or free happens; the block changes owner.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let alloc = self.alloc.clone();
        mem::replace(self, Self::empty_in(alloc))
    }

    /// Exchange blocks with `other`.
    ///
    /// This is the assignment form of ownership transfer: the receiver's
    /// previous block is not freed here but handed to `other`, and is
    /// released whenever `other` is dropped.
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl Default for OpaqueStorage {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A: OpaqueAllocator> Drop for OpaqueStorage<A> {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        if let Some(block) = self.storage.take() {
            tracing::trace!(ptr = ?block, size = self.layout.size(), "opaque block freed");
            // SAFETY: `block` was allocated by `self.alloc` with `self.layout`
            // and ownership never left this container.
            unsafe { self.alloc.deallocate(block, self.layout) };
        }
    }
}

impl<A: OpaqueAllocator> fmt::Debug for OpaqueStorage<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.storage {
            Some(block) => f
                .debug_struct("OpaqueStorage")
                .field("ptr", &block)
                .field("size", &self.layout.size())
                .field("align", &self.layout.align())
                .finish(),
            None => f.write_str("OpaqueStorage(absent)"),
        }
    }
}

impl<A: OpaqueAllocator> Bridged for OpaqueStorage<A> {
    const IS_OPAQUE_LAYOUT: bool = true;

    fn opaque_pointer(&self) -> *const u8 {
        self.as_ptr()
    }

    fn opaque_pointer_mut(&mut self) -> *mut u8 {
        self.as_mut_ptr()
    }
}

// SAFETY: the block is exclusively owned; moving the container between
// threads moves sole ownership with it.
#[allow(unsafe_code)]
unsafe impl<A: OpaqueAllocator + Send> Send for OpaqueStorage<A> {}

// SAFETY: shared references only expose a `*const u8`; reading through it
// is already an `unsafe` operation for the caller.
#[allow(unsafe_code)]
unsafe impl<A: OpaqueAllocator + Sync> Sync for OpaqueStorage<A> {}
