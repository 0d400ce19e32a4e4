//! Read-only element storage.
//!
//! Arrays created without elements start in the constant-empty state, and
//! arrays built from an immutable literal snapshot start as a constant
//! array. Both turn writable on the first mutation; the constant states
//! exist so that untouched arrays carry no allocation and literal arrays
//! can share one snapshot.

use std::rc::Rc;

use crate::value::JsValue;

/// Storage of an array that has never held an element.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantEmptyArray {
    /// Set for `Array.prototype` itself. A write through this storage must
    /// revoke the realm-wide assumption that the array prototype has no
    /// indexed elements.
    pub(crate) for_prototype: bool,
}

impl ConstantEmptyArray {
    pub fn new() -> Self {
        Self {
            for_prototype: false,
        }
    }

    pub fn for_prototype() -> Self {
        Self {
            for_prototype: true,
        }
    }
}

impl Default for ConstantEmptyArray {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of elements, shared between arrays built from the
/// same literal. No holes.
#[derive(Clone, Debug)]
pub struct ConstantArray {
    pub(super) items: Rc<[JsValue]>,
}

impl ConstantArray {
    pub fn new(items: Rc<[JsValue]>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> u64 {
        self.items.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has(&self, index: u64) -> bool {
        index < self.len()
    }

    pub fn get(&self, index: u64) -> Option<&JsValue> {
        self.items.get(index as usize)
    }

    pub fn items(&self) -> &[JsValue] {
        &self.items
    }
}
