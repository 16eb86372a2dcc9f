//! Violation capture and a hand-written stand-in for a generated wrapper.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ferry_core::contract::{self, Violation};
use ferry_core::traits::Bridged;
use ferry_refcount::RefCounted;

use crate::{mock_object, MockRuntime, Probe};

/// Violation handler that panics with the [`Violation`] as payload.
pub fn panic_on_violation(violation: &Violation) -> ! {
    panic::panic_any(violation.clone())
}

/// Run `f`, which must raise a contract violation, and return it.
///
/// The panicking handler is installed for the current thread only, so
/// other tests keep the default abort behaviour. Panics if `f` completes
/// normally; any other panic is resumed unchanged.
pub fn expect_violation<R>(f: impl FnOnce() -> R) -> Violation {
    let outcome =
        contract::with_handler(panic_on_violation, || panic::catch_unwind(AssertUnwindSafe(f)));
    match outcome {
        Ok(_) => panic!("expected a contract violation, but the operation completed"),
        Err(payload) => match payload.downcast::<Violation>() {
            Ok(violation) => *violation,
            Err(other) => panic::resume_unwind(other),
        },
    }
}

/// The shape generated bindings emit for a foreign class: a newtype over
/// a handle, with copy semantics inherited from it.
#[derive(Clone, Debug)]
pub struct Widget {
    handle: RefCounted<MockRuntime>,
}

impl Widget {
    /// A new widget and the probe of its backing object.
    pub fn new() -> (Self, Arc<Probe>) {
        let (handle, probe) = mock_object();
        (Self { handle }, probe)
    }

    pub fn handle(&self) -> &RefCounted<MockRuntime> {
        &self.handle
    }
}

impl Bridged for Widget {
    const IS_REF_COUNTED: bool = true;
    const IS_USABLE_IN_GENERIC_CONTEXT: bool = true;
}
