//! Integration test: the shapes generated bindings produce, end to end.
//!
//! A hand-written "generated" module wraps a mock foreign class and a
//! resilient struct, and a throwing method returns through `Expected`.

use ferry::prelude::*;
use ferry::opaque_value;
use ferry_test_utils::{mock_object, MockRuntime, Probe};
use proptest::prelude::*;
use std::sync::Arc;

opaque_value! {
    /// A resilient foreign struct with two `Int` fields.
    pub struct Size { size: 16, align: 8 }
}

impl Size {
    fn new(width: Int, height: Int) -> Result<Self, AllocError> {
        let mut size = Self::allocate()?;
        let fields = ferry::types::traits::opaque_pointer_mut(&mut size).cast::<Int>();
        // SAFETY: the block is 16 bytes, aligned for `Int`.
        unsafe {
            fields.write(width);
            fields.add(1).write(height);
        }
        Ok(size)
    }

    fn width(&self) -> Int {
        // SAFETY: initialised in `new`.
        unsafe { ferry::types::traits::opaque_pointer(self).cast::<Int>().read() }
    }
}

#[derive(Clone, Debug)]
struct Canvas {
    handle: RefCounted<MockRuntime>,
}

impl Canvas {
    fn new() -> (Self, Arc<Probe>) {
        let (handle, probe) = mock_object();
        (Self { handle }, probe)
    }

    /// Stands in for a throwing foreign method.
    fn resize(&self, size: &Size) -> Expected<Canvas> {
        if size.width() < 0 {
            return Expected::from_error(
                ForeignError::new("CanvasError", 2).with_message("negative width"),
            );
        }
        Expected::from_value(self.clone())
    }
}

impl Bridged for Canvas {
    const IS_REF_COUNTED: bool = true;
    const IS_USABLE_IN_GENERIC_CONTEXT: bool = true;
}

#[test]
fn successful_call_returns_retained_object() {
    let (canvas, probe) = Canvas::new();
    let size = Size::new(640, 480).expect("allocation succeeds");
    let result = canvas.resize(&size);
    assert!(result.has_value());
    assert!(result.handle.ptr_eq(&canvas.handle));
    assert_eq!(probe.credits(), 2);
    drop(result);
    drop(canvas);
    assert!(probe.is_destroyed());
}

#[test]
fn failing_call_returns_error_and_no_credit() {
    let (canvas, probe) = Canvas::new();
    let size = Size::new(-1, 0).expect("allocation succeeds");
    let result = canvas.resize(&size);
    assert!(!result.has_value());
    assert_eq!(result.error().code(), 2);
    assert_eq!(probe.credits(), 1);
    let err = result.into_result().expect_err("failure");
    assert_eq!(err.to_string(), "CanvasError error 2: negative width");
}

#[test]
fn capability_flags_of_generated_types() {
    assert!(<Size as Bridged>::IS_OPAQUE_LAYOUT);
    assert!(!<Size as Bridged>::IS_REF_COUNTED);
    assert!(<Canvas as Bridged>::IS_REF_COUNTED);
    assert!(<Expected<Canvas> as Bridged>::IS_USABLE_IN_GENERIC_CONTEXT);
    assert!(<Expected<Int> as Bridged>::IS_USABLE_IN_GENERIC_CONTEXT);
    assert_eq!(ferry::types::max_size(Size::SIZE, std::mem::size_of::<Canvas>()), 16);
}

proptest! {
    #[test]
    fn resize_outcome_follows_width(width in any::<Int>(), height in any::<Int>()) {
        let (canvas, probe) = Canvas::new();
        let size = Size::new(width, height).expect("allocation succeeds");
        prop_assert_eq!(size.width(), width);

        let result = canvas.resize(&size);
        prop_assert_eq!(result.has_value(), width >= 0);
        if result.has_value() {
            prop_assert!(result.handle.ptr_eq(&canvas.handle));
            prop_assert_eq!(probe.credits(), 2);
        } else {
            prop_assert_eq!(result.error().domain(), "CanvasError");
            prop_assert_eq!(probe.credits(), 1);
        }
        drop(result);
        drop(canvas);
        prop_assert!(probe.is_destroyed());
    }
}
