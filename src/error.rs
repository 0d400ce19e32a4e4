//! Error types for the array/object engine

use thiserror::Error;

/// Main error type surfaced by storage operations and builtins.
///
/// The two ECMAScript error classes the core can raise on its own are
/// `TypeError` and `RangeError`; everything else the language defines
/// (SyntaxError, ReferenceError, ...) belongs to the interpreter layers
/// sitting on top of this crate.
#[derive(Debug, Error)]
pub enum JsError {
    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    /// Engine invariant violation. Reaching this is a bug in the embedder
    /// or in the crate itself, never a user-visible language error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JsError {
    /// Create a TypeError with the given message
    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    /// Create a RangeError with the given message
    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::RangeError {
            message: message.into(),
        }
    }

    /// RangeError raised when an operation would push an array length past
    /// the safe-integer bound.
    pub fn invalid_array_length() -> Self {
        JsError::range_error("Invalid array length")
    }

    /// TypeError raised when a mutation would grow an array length past
    /// the safe-integer bound.
    pub fn length_too_big() -> Self {
        JsError::type_error("length too big")
    }

    /// RangeError raised when a string operation exceeds the realm's
    /// string length limit.
    pub fn invalid_string_length() -> Self {
        JsError::range_error("Invalid string length")
    }

    /// True if this is a TypeError-class failure
    pub fn is_type_error(&self) -> bool {
        matches!(self, JsError::TypeError { .. })
    }

    /// True if this is a RangeError-class failure
    pub fn is_range_error(&self) -> bool {
        matches!(self, JsError::RangeError { .. })
    }
}
