//! Foreign indexed receivers.
//!
//! Host embedders can hand the engine objects whose indexed elements live
//! outside the element storage engine entirely. The generic builtins drive
//! such receivers through this trait, element by element, and never attempt
//! storage-kind specializations on them.

use crate::error::JsError;
use crate::value::JsValue;

/// An indexed collection owned by the host rather than by the engine.
///
/// Reads and writes are allowed to fail; a failure surfaces to JavaScript
/// as the error the implementation returns.
pub trait ForeignIndexed {
    /// Number of elements; drives the length observed by the builtins.
    fn size(&self) -> u64;

    /// Read the element at `index`. Out-of-range reads yield `Undefined`.
    fn read(&self, index: u64) -> Result<JsValue, JsError>;

    /// Write the element at `index`.
    fn write(&mut self, index: u64, value: JsValue) -> Result<(), JsError>;

    /// Remove the element at `index`, if the collection supports removal.
    fn remove(&mut self, index: u64) -> Result<(), JsError>;
}

impl std::fmt::Debug for dyn ForeignIndexed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ForeignIndexed(size = {})", self.size())
    }
}
