//! The default foreign error payload.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

/// An error thrown by a foreign function, carried as plain data.
///
/// `domain` names the error type on the foreign side, `code` its case.
/// The default value (empty domain, code 0) is what a default-constructed
/// [`Expected`](crate::Expected) holds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ForeignError {
    domain: Cow<'static, str>,
    code: i64,
    message: String,
}

impl ForeignError {
    /// An error with the given domain and code and no message.
    pub fn new(domain: impl Into<Cow<'static, str>>, code: i64) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: String::new(),
        }
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// The foreign error type name.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The error case within its domain.
    pub fn code(&self) -> i64 {
        self.code
    }

    /// The message, empty if none was attached.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ForeignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.domain.is_empty() {
            write!(f, "foreign error {}", self.code)?;
        } else {
            write!(f, "{} error {}", self.domain, self.code)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl Error for ForeignError {}
