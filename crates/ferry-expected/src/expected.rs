//! [`Expected`]: exactly one of a value or a foreign error.

use std::any::type_name;
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};

use ferry_core::contract::{violate, Variant, Violation};
use ferry_core::traits::Bridged;

use crate::error::ForeignError;

#[derive(Debug, PartialEq, Eq)]
enum Payload<T, E> {
    Value(T),
    Error(E),
    /// Left behind by `take`; never observable through the public API
    /// except as a violation.
    Vacated,
}

/// The result of a foreign call that can throw.
///
/// Holds either a value of type `T` (success) or an error of type `E`
/// (failure), inline, with no heap allocation of its own. There is no way
/// to switch variants in place; replace the whole `Expected` instead.
///
/// Accessors for the payload that is *not* held do not return `None`; they
/// raise a [`Violation::WrongVariant`]. Check [`has_value`](Self::has_value)
/// first, or convert with [`into_result`](Self::into_result).
///
/// ```
/// use ferry_expected::{Expected, ForeignError};
///
/// let ok: Expected<u32> = Expected::from_value(7);
/// assert!(ok.has_value());
/// assert_eq!(*ok, 7);
///
/// let failed: Expected<u32> = Expected::from_error(ForeignError::new("IOError", 2));
/// assert!(!failed.has_value());
/// assert_eq!(failed.error().code(), 2);
/// ```
#[derive(PartialEq, Eq)]
pub struct Expected<T, E = ForeignError> {
    payload: Payload<T, E>,
}

impl<T, E> Expected<T, E> {
    /// A success holding `value`.
    pub fn from_value(value: T) -> Self {
        Self {
            payload: Payload::Value(value),
        }
    }

    /// A failure holding `error`.
    pub fn from_error(error: E) -> Self {
        Self {
            payload: Payload::Error(error),
        }
    }

    /// Whether this is a success. Never fails.
    pub fn has_value(&self) -> bool {
        matches!(self.payload, Payload::Value(_))
    }

    /// The success payload.
    ///
    /// Raises [`Violation::WrongVariant`] on a failure.
    pub fn value(&self) -> &T {
        match &self.payload {
            Payload::Value(value) => value,
            Payload::Error(_) => wrong_variant(Variant::Value),
            Payload::Vacated => self.vacated(),
        }
    }

    /// Mutable access to the success payload.
    ///
    /// Raises [`Violation::WrongVariant`] on a failure.
    pub fn value_mut(&mut self) -> &mut T {
        match &mut self.payload {
            Payload::Value(value) => value,
            Payload::Error(_) => wrong_variant(Variant::Value),
            Payload::Vacated => vacated::<Self>(),
        }
    }

    /// The failure payload.
    ///
    /// Raises [`Violation::WrongVariant`] on a success.
    pub fn error(&self) -> &E {
        match &self.payload {
            Payload::Error(error) => error,
            Payload::Value(_) => wrong_variant(Variant::Error),
            Payload::Vacated => self.vacated(),
        }
    }

    /// Mutable access to the failure payload.
    ///
    /// Raises [`Violation::WrongVariant`] on a success.
    pub fn error_mut(&mut self) -> &mut E {
        match &mut self.payload {
            Payload::Error(error) => error,
            Payload::Value(_) => wrong_variant(Variant::Error),
            Payload::Vacated => vacated::<Self>(),
        }
    }

    /// Move the payload out of a place that is only mutably borrowed.
    ///
    /// `self` is left vacated: dropping it is a no-op and any accessor
    /// other than [`has_value`](Self::has_value) is a violation.
    pub fn take(&mut self) -> Self {
        match mem::replace(&mut self.payload, Payload::Vacated) {
            Payload::Vacated => vacated::<Self>(),
            payload => Self { payload },
        }
    }

    /// Convert into a standard `Result` for `?` propagation.
    pub fn into_result(self) -> Result<T, E> {
        match self.payload {
            Payload::Value(value) => Ok(value),
            Payload::Error(error) => Err(error),
            Payload::Vacated => vacated::<Self>(),
        }
    }

    /// Borrow as a standard `Result`.
    pub fn as_result(&self) -> Result<&T, &E> {
        match &self.payload {
            Payload::Value(value) => Ok(value),
            Payload::Error(error) => Err(error),
            Payload::Vacated => self.vacated(),
        }
    }

    fn vacated(&self) -> ! {
        vacated::<Self>()
    }
}

#[cold]
fn wrong_variant(expected: Variant) -> ! {
    violate(Violation::WrongVariant { expected })
}

#[cold]
fn vacated<S>() -> ! {
    violate(Violation::VacatedHandle {
        type_name: type_name::<S>(),
    })
}

/// A failure holding `E::default()`.
impl<T, E: Default> Default for Expected<T, E> {
    fn default() -> Self {
        Self::from_error(E::default())
    }
}

/// Copies whichever payload is live.
impl<T: Clone, E: Clone> Clone for Expected<T, E> {
    fn clone(&self) -> Self {
        let payload = match &self.payload {
            Payload::Value(value) => Payload::Value(value.clone()),
            Payload::Error(error) => Payload::Error(error.clone()),
            Payload::Vacated => self.vacated(),
        };
        Self { payload }
    }
}

impl<T, E> From<Result<T, E>> for Expected<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::from_value(value),
            Err(error) => Self::from_error(error),
        }
    }
}

impl<T, E> Deref for Expected<T, E> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value()
    }
}

impl<T, E> DerefMut for Expected<T, E> {
    fn deref_mut(&mut self) -> &mut T {
        self.value_mut()
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Expected<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Payload::Error(error) => f.debug_tuple("Error").field(error).finish(),
            Payload::Vacated => f.write_str("Vacated"),
        }
    }
}

impl<T: Bridged, E> Bridged for Expected<T, E> {
    const IS_USABLE_IN_GENERIC_CONTEXT: bool = T::IS_USABLE_IN_GENERIC_CONTEXT;
}
