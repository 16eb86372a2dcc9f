//! Fatal contract violations.
//!
//! Reading the wrong variant of a tagged result, touching an absent opaque
//! block or using a handle after its credit was taken are bugs in the
//! calling code, not recoverable conditions. Every primitive reports them
//! through [`violate`], which never returns.
//!
//! The default handler logs the violation and aborts the process. Test
//! harnesses swap it out with [`with_handler`] (current thread only) or
//! [`set_handler`] (process wide) to intercept violations deterministically,
//! typically by panicking with the [`Violation`] as payload.

use std::cell::Cell;
use std::fmt;
use std::sync::RwLock;

/// Which payload of a tagged result the caller asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// The success payload.
    Value,
    /// The foreign error payload.
    Error,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => f.write_str("value"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A misuse of one of the interop primitives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// A tagged result was read as `expected` while holding the other payload.
    WrongVariant {
        /// The payload the caller asked for.
        expected: Variant,
    },
    /// The raw pointer of an opaque container was requested while it holds
    /// no storage.
    AbsentStorage,
    /// A value was used after its payload was moved out with `take`.
    VacatedHandle {
        /// Rust type name of the vacated value.
        type_name: &'static str,
    },
    /// A null pointer was handed to an entry point that adopts a foreign
    /// reference.
    NullForeignPointer,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongVariant { expected } => {
                let held = match expected {
                    Variant::Value => Variant::Error,
                    Variant::Error => Variant::Value,
                };
                write!(f, "accessed {expected} of a result holding {held}")
            }
            Self::AbsentStorage => write!(f, "accessed pointer of an absent opaque container"),
            Self::VacatedHandle { type_name } => {
                write!(f, "used {type_name} after its payload was taken")
            }
            Self::NullForeignPointer => write!(f, "null foreign reference adopted"),
        }
    }
}

/// A function that handles a violation. It cannot return.
pub type ViolationHandler = fn(&Violation) -> !;

static GLOBAL_HANDLER: RwLock<Option<ViolationHandler>> = RwLock::new(None);

thread_local! {
    static LOCAL_HANDLER: Cell<Option<ViolationHandler>> = const { Cell::new(None) };
}

/// Report a contract violation. Never returns.
///
/// Dispatches to the thread-local handler installed by [`with_handler`] if
/// any, else the process-wide handler from [`set_handler`], else the
/// default abort handler.
#[cold]
#[inline(never)]
pub fn violate(violation: Violation) -> ! {
    let handler = current_handler();
    handler(&violation)
}

fn current_handler() -> ViolationHandler {
    let local = LOCAL_HANDLER.try_with(Cell::get).ok().flatten();
    local
        .or_else(|| GLOBAL_HANDLER.read().ok().and_then(|slot| *slot))
        .unwrap_or(abort_handler as ViolationHandler)
}

/// The default handler: log and abort the process.
pub fn abort_handler(violation: &Violation) -> ! {
    tracing::error!(%violation, "contract violation");
    eprintln!("ferry: contract violation: {violation}");
    std::process::abort()
}

/// Replace the process-wide violation handler.
///
/// Thread-local handlers installed with [`with_handler`] still take
/// precedence on their threads.
pub fn set_handler(handler: ViolationHandler) {
    match GLOBAL_HANDLER.write() {
        Ok(mut slot) => *slot = Some(handler),
        Err(poisoned) => *poisoned.into_inner() = Some(handler),
    }
}

/// Restore the default abort handler as the process-wide handler.
pub fn reset_handler() {
    match GLOBAL_HANDLER.write() {
        Ok(mut slot) => *slot = None,
        Err(poisoned) => *poisoned.into_inner() = None,
    }
}

/// Run `f` with `handler` installed for the current thread.
///
/// The previous thread-local handler is restored when `f` returns or
/// unwinds, so calls nest.
pub fn with_handler<R>(handler: ViolationHandler, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<ViolationHandler>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0;
            let _ = LOCAL_HANDLER.try_with(|slot| slot.set(previous));
        }
    }

    let previous = LOCAL_HANDLER.with(|slot| slot.replace(Some(handler)));
    let _restore = Restore(previous);
    f()
}
