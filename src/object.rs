//! Object representation.
//!
//! A `JsObject` keeps its named properties in a flat slot vector described
//! by a shape, and anything beyond a plain object in its `exotic` payload:
//! arrays carry their length and element storage, functions carry the host
//! callable, foreign objects carry a host-indexed collection.
//!
//! This module only holds the primitives over slots and shapes; property
//! access semantics (prototype chains, accessors, the array length
//! property) live in `access`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::elements::ElementArray;
use crate::error::JsError;
use crate::interop::ForeignIndexed;
use crate::realm::Realm;
use crate::shape::{Shape, ShapeRegistry};
use crate::value::{JsString, JsValue, PropertyAttributes, PropertyKey};

pub type JsObjectRef = Rc<RefCell<JsObject>>;

/// Signature of every builtin and embedder-supplied function:
/// `(realm, this, arguments) -> completion`.
pub type NativeFn = dyn Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

/// One named property slot.
#[derive(Clone, Debug)]
pub enum PropertySlot {
    Data(JsValue),
    Accessor {
        get: Option<JsValue>,
        set: Option<JsValue>,
    },
}

/// How far an object has been locked down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegrityLevel {
    None,
    NonExtensible,
    Sealed,
    Frozen,
}

/// The array-specific state of an array object.
#[derive(Debug)]
pub struct ArrayData {
    /// The `length` property. Can exceed every populated index.
    pub length: u64,
    pub storage: ElementArray,
    /// Cleared when `length` is redefined non-writable; writes to length
    /// then fail silently (or throw, at the caller's discretion).
    pub length_writable: bool,
}

impl ArrayData {
    pub fn new(length: u64, storage: ElementArray) -> Self {
        Self {
            length,
            storage,
            length_writable: true,
        }
    }
}

/// A function object backed by a host callable.
pub struct NativeFunction {
    pub name: JsString,
    pub func: Rc<NativeFn>,
    pub arity: usize,
    pub is_constructor: bool,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// Payload distinguishing plain objects from the exotic kinds.
#[derive(Debug)]
pub enum ExoticObject {
    Ordinary,
    Array(ArrayData),
    Function(NativeFunction),
    Foreign(Box<dyn ForeignIndexed>),
}

#[derive(Debug)]
pub struct JsObject {
    pub prototype: Option<JsObjectRef>,
    pub shape: Rc<Shape>,
    slots: Vec<PropertySlot>,
    pub integrity: IntegrityLevel,
    pub exotic: ExoticObject,
}

impl JsObject {
    pub fn new(prototype: Option<JsObjectRef>, shape: Rc<Shape>, exotic: ExoticObject) -> Self {
        Self {
            prototype,
            shape,
            slots: Vec::new(),
            integrity: IntegrityLevel::None,
            exotic,
        }
    }

    pub fn into_ref(self) -> JsObjectRef {
        Rc::new(RefCell::new(self))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.exotic, ExoticObject::Function(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.exotic, ExoticObject::Array(_))
    }

    pub fn as_array(&self) -> Option<&ArrayData> {
        match &self.exotic {
            ExoticObject::Array(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayData> {
        match &mut self.exotic {
            ExoticObject::Array(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&NativeFunction> {
        match &self.exotic {
            ExoticObject::Function(func) => Some(func),
            _ => None,
        }
    }

    pub fn is_extensible(&self) -> bool {
        self.integrity == IntegrityLevel::None
    }

    /// Slot offset and attributes of an own named property.
    pub fn lookup(&self, key: &PropertyKey) -> Option<(usize, PropertyAttributes)> {
        self.shape.lookup(key)
    }

    pub fn slot(&self, offset: usize) -> &PropertySlot {
        &self.slots[offset]
    }

    pub fn slot_mut(&mut self, offset: usize) -> &mut PropertySlot {
        &mut self.slots[offset]
    }

    /// Add a property this object does not have yet. The caller has already
    /// checked extensibility.
    pub fn add_property(
        &mut self,
        registry: &ShapeRegistry,
        key: PropertyKey,
        slot: PropertySlot,
        attributes: PropertyAttributes,
    ) {
        debug_assert!(self.lookup(&key).is_none());
        self.shape = registry.transition(&self.shape, key, attributes);
        self.slots.push(slot);
    }

    /// Remove an own named property; false if it is non-configurable.
    pub fn remove_property(&mut self, registry: &ShapeRegistry, key: &PropertyKey) -> bool {
        let Some((offset, attributes)) = self.lookup(key) else {
            return true;
        };
        if !attributes.configurable {
            return false;
        }
        self.shape = registry.without_key(&self.shape, key);
        self.slots.remove(offset);
        true
    }

    /// Replace the attributes of an existing property.
    pub fn set_attributes(
        &mut self,
        registry: &ShapeRegistry,
        key: &PropertyKey,
        attributes: PropertyAttributes,
    ) {
        self.shape = registry.with_attributes(&self.shape, key, attributes);
    }

    /// Object.preventExtensions.
    pub fn prevent_extensions(&mut self) {
        if self.integrity == IntegrityLevel::None {
            self.integrity = IntegrityLevel::NonExtensible;
        }
    }

    /// Object.seal: non-extensible plus every property non-configurable.
    pub fn seal(&mut self, registry: &ShapeRegistry) {
        self.shape = registry.map_attributes(&self.shape, |mut attrs| {
            attrs.configurable = false;
            attrs
        });
        if self.integrity != IntegrityLevel::Frozen {
            self.integrity = IntegrityLevel::Sealed;
        }
    }

    /// Object.freeze: sealed plus every data property non-writable.
    pub fn freeze(&mut self, registry: &ShapeRegistry) {
        self.shape = registry.map_attributes(&self.shape, |mut attrs| {
            attrs.configurable = false;
            attrs.writable = false;
            attrs
        });
        self.integrity = IntegrityLevel::Frozen;
        if let ExoticObject::Array(data) = &mut self.exotic {
            data.length_writable = false;
        }
    }

    pub fn is_sealed(&self) -> bool {
        matches!(
            self.integrity,
            IntegrityLevel::Sealed | IntegrityLevel::Frozen
        )
    }

    pub fn is_frozen(&self) -> bool {
        self.integrity == IntegrityLevel::Frozen
    }
}
