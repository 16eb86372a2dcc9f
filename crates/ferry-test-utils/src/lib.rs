//! Test utilities and instrumented doubles for Ferry development.
//!
//! Provides a counting foreign runtime ([`MockRuntime`] with per-object
//! [`Probe`]s), a counting block allocator ([`CountingAllocator`]), and
//! helpers that turn contract violations into catchable panics
//! ([`expect_violation`]).
//!
//! Counters live with each object or allocator instance rather than in
//! globals, so tests running in parallel never observe each other.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::alloc::Layout;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ferry_alloc::{OpaqueAllocator, System};
use ferry_refcount::{ForeignRuntime, RefCounted};

pub use fixtures::{expect_violation, panic_on_violation, Widget};

/// Observable state of one mock foreign object.
///
/// Starts with one credit, owned by whoever allocated the object.
#[derive(Debug)]
pub struct Probe {
    credits: AtomicUsize,
    retains: AtomicUsize,
    releases: AtomicUsize,
    destroyed: AtomicBool,
}

impl Probe {
    fn with_one_credit() -> Self {
        Self {
            credits: AtomicUsize::new(1),
            retains: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Credits currently outstanding.
    pub fn credits(&self) -> usize {
        self.credits.load(Ordering::SeqCst)
    }

    /// Number of retain calls observed.
    pub fn retains(&self) -> usize {
        self.retains.load(Ordering::SeqCst)
    }

    /// Number of release calls observed.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Whether the last credit was released.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

/// Foreign runtime double that counts every retain and release.
///
/// Objects are [`Probe`]s shared through an `Arc`, so a test can keep
/// inspecting an object after the runtime considers it destroyed. Retaining
/// or releasing a destroyed object panics.
pub enum MockRuntime {}

impl MockRuntime {
    /// Create an object and return its raw pointer carrying one credit.
    #[allow(unsafe_code)]
    pub fn allocate() -> (NonNull<c_void>, Arc<Probe>) {
        let probe = Arc::new(Probe::with_one_credit());
        let raw = Arc::into_raw(Arc::clone(&probe));
        // SAFETY: `Arc::into_raw` never returns null.
        let object = unsafe { NonNull::new_unchecked(raw.cast_mut()) };
        (object.cast(), probe)
    }

    #[allow(unsafe_code)]
    unsafe fn probe<'a>(object: NonNull<c_void>) -> &'a Probe {
        // SAFETY: every pointer this runtime sees came from `allocate`, and
        // the caller's credit keeps the runtime's `Arc` alive.
        unsafe { object.cast::<Probe>().as_ref() }
    }
}

// SAFETY: all counters are atomic; the object is freed only when the
// credit count reaches zero.
#[allow(unsafe_code)]
unsafe impl ForeignRuntime for MockRuntime {
    unsafe fn retain(object: NonNull<c_void>) -> NonNull<c_void> {
        // SAFETY: forwarded caller contract.
        let probe = unsafe { Self::probe(object) };
        assert!(!probe.is_destroyed(), "retain on a destroyed object");
        probe.retains.fetch_add(1, Ordering::SeqCst);
        probe.credits.fetch_add(1, Ordering::SeqCst);
        object
    }

    unsafe fn release(object: NonNull<c_void>) {
        // SAFETY: forwarded caller contract.
        let probe = unsafe { Self::probe(object) };
        assert!(!probe.is_destroyed(), "release on a destroyed object");
        probe.releases.fetch_add(1, Ordering::SeqCst);
        if probe.credits.fetch_sub(1, Ordering::SeqCst) == 1 {
            probe.destroyed.store(true, Ordering::SeqCst);
            // SAFETY: this is the pointer `allocate` produced with
            // `Arc::into_raw`, reclaimed exactly once on the last release.
            drop(unsafe { Arc::from_raw(object.cast::<Probe>().as_ptr().cast_const()) });
        }
    }
}

/// A fresh mock object wrapped in a handle, plus its probe.
pub fn mock_object() -> (RefCounted<MockRuntime>, Arc<Probe>) {
    let (object, probe) = MockRuntime::allocate();
    // SAFETY: `allocate` hands us the object's only credit.
    #[allow(unsafe_code)]
    let handle = unsafe { RefCounted::from_retained(object) };
    (handle, probe)
}

#[derive(Debug, Default)]
struct AllocStats {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    refuse: AtomicBool,
    freed: Mutex<Vec<usize>>,
}

/// Block allocator that counts calls and can be told to fail.
///
/// Clones share counters, so the copy moved into an `OpaqueStorage` and
/// the one kept by the test report the same numbers.
#[derive(Clone, Debug, Default)]
pub struct CountingAllocator {
    stats: Arc<AllocStats>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator whose every request fails.
    pub fn refusing() -> Self {
        let alloc = Self::default();
        alloc.set_refuse(true);
        alloc
    }

    pub fn set_refuse(&self, refuse: bool) {
        self.stats.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn allocations(&self) -> usize {
        self.stats.allocations.load(Ordering::SeqCst)
    }

    pub fn deallocations(&self) -> usize {
        self.stats.deallocations.load(Ordering::SeqCst)
    }

    /// Blocks allocated and not yet freed.
    pub fn live(&self) -> usize {
        self.allocations() - self.deallocations()
    }

    /// Whether a block at `ptr` has been freed through this allocator.
    pub fn was_freed(&self, ptr: *const u8) -> bool {
        let freed = self
            .stats
            .freed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        freed.contains(&(ptr as usize))
    }

    fn refused(&self) -> bool {
        self.stats.refuse.load(Ordering::SeqCst)
    }
}

// SAFETY: every block comes from and returns to `System`.
#[allow(unsafe_code)]
unsafe impl OpaqueAllocator for CountingAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.refused() {
            return None;
        }
        let block = System.allocate(layout)?;
        self.stats.allocations.fetch_add(1, Ordering::SeqCst);
        Some(block)
    }

    fn allocate_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.refused() {
            return None;
        }
        let block = System.allocate_zeroed(layout)?;
        self.stats.allocations.fetch_add(1, Ordering::SeqCst);
        Some(block)
    }

    unsafe fn deallocate(&self, block: NonNull<u8>, layout: Layout) {
        self.stats.deallocations.fetch_add(1, Ordering::SeqCst);
        self.stats
            .freed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(block.as_ptr() as usize);
        // SAFETY: forwarded caller contract; the block came from `System`.
        unsafe { System.deallocate(block, layout) }
    }
}
