//! Shapes (hidden layouts) for named property storage.
//!
//! A shape describes which named properties an object has, at which slot
//! offsets, and with which attributes. Objects built by the same sequence
//! of property additions share a shape through a transition tree, which is
//! what lets the metadata cache (`shape_data`) amortize enumeration work
//! across every object with the same layout.
//!
//! Array indices never enter a shape; indexed elements live in the element
//! storage engine (`elements`).

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::value::{PropertyAttributes, PropertyKey};

/// One named property as laid out by a shape.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyRecord {
    pub key: PropertyKey,
    pub offset: usize,
    pub attributes: PropertyAttributes,
}

/// Transition edges are keyed by the added property and its attributes, so
/// `{x: writable}` and `{x: frozen}` land on different child shapes.
#[derive(Clone, PartialEq, Eq, Hash)]
struct TransitionKey {
    key: PropertyKey,
    attributes: PropertyAttributes,
}

/// A shape node in the transition tree.
pub struct Shape {
    /// Identity used as the metadata-cache key. Never reused.
    id: u64,
    /// The shape this one extends; None for the root (empty) shape.
    parent: Option<Rc<Shape>>,
    /// The property added relative to the parent.
    record: Option<PropertyRecord>,
    /// All properties of this shape: key -> (slot offset, attributes).
    table: FxHashMap<PropertyKey, (usize, PropertyAttributes)>,
    /// Keys in insertion order.
    keys: Vec<PropertyKey>,
    /// Child shapes. Weak so abandoned layouts can be dropped:
    /// child -> parent is strong, parent -> child is weak.
    transitions: RefCell<FxHashMap<TransitionKey, Weak<Shape>>>,
}

impl Shape {
    /// Identity of this layout.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Slot offset and attributes for a key, if present.
    pub fn lookup(&self, key: &PropertyKey) -> Option<(usize, PropertyAttributes)> {
        self.table.get(key).copied()
    }

    /// Number of named properties in this layout.
    pub fn property_count(&self) -> usize {
        self.keys.len()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> &[PropertyKey] {
        &self.keys
    }

    /// All property records in insertion order.
    pub fn records(&self) -> Vec<PropertyRecord> {
        self.keys
            .iter()
            .map(|key| {
                // keys and table are maintained together; a key missing from
                // the table would mean the shape was built inconsistently.
                let (offset, attributes) = self.table[key];
                PropertyRecord {
                    key: key.clone(),
                    offset,
                    attributes,
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shape")
            .field("id", &self.id)
            .field("record", &self.record)
            .field("property_count", &self.property_count())
            .finish()
    }
}

/// Owner of the transition tree and the shape id counter. One per realm.
pub struct ShapeRegistry {
    root: Rc<Shape>,
    next_id: Cell<u64>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        let root = Rc::new(Shape {
            id: 0,
            parent: None,
            record: None,
            table: FxHashMap::default(),
            keys: Vec::new(),
            transitions: RefCell::new(FxHashMap::default()),
        });
        Self {
            root,
            next_id: Cell::new(1),
        }
    }

    /// The empty layout every object starts from.
    pub fn root(&self) -> Rc<Shape> {
        Rc::clone(&self.root)
    }

    fn alloc_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Follow (or create) the transition adding `key` with `attributes`.
    pub fn transition(
        &self,
        from: &Rc<Shape>,
        key: PropertyKey,
        attributes: PropertyAttributes,
    ) -> Rc<Shape> {
        let tkey = TransitionKey {
            key: key.clone(),
            attributes,
        };
        if let Some(weak) = from.transitions.borrow().get(&tkey) {
            if let Some(shape) = weak.upgrade() {
                return shape;
            }
        }

        let mut transitions = from.transitions.borrow_mut();
        // Re-check after taking the mutable borrow.
        if let Some(weak) = transitions.get(&tkey) {
            if let Some(shape) = weak.upgrade() {
                return shape;
            }
        }

        let offset = from.property_count();
        let mut table = from.table.clone();
        table.insert(key.clone(), (offset, attributes));
        let mut keys = from.keys.clone();
        keys.push(key.clone());

        let shape = Rc::new(Shape {
            id: self.alloc_id(),
            parent: Some(Rc::clone(from)),
            record: Some(PropertyRecord {
                key,
                offset,
                attributes,
            }),
            table,
            keys,
            transitions: RefCell::new(FxHashMap::default()),
        });
        transitions.insert(tkey, Rc::downgrade(&shape));
        shape
    }

    /// Layout with one property removed. Rebuilt from the root so slot
    /// offsets stay contiguous; the caller must compact its slot vector to
    /// match.
    pub fn without_key(&self, from: &Rc<Shape>, removed: &PropertyKey) -> Rc<Shape> {
        let mut shape = self.root();
        for record in from.records() {
            if &record.key == removed {
                continue;
            }
            shape = self.transition(&shape, record.key, record.attributes);
        }
        shape
    }

    /// Layout with one property's attributes replaced. Slot offsets are
    /// preserved, so object slot vectors stay valid.
    pub fn with_attributes(
        &self,
        from: &Rc<Shape>,
        key: &PropertyKey,
        attributes: PropertyAttributes,
    ) -> Rc<Shape> {
        let mut shape = self.root();
        for record in from.records() {
            let attrs = if &record.key == key {
                attributes
            } else {
                record.attributes
            };
            shape = self.transition(&shape, record.key, attrs);
        }
        shape
    }

    /// Layout with every property's attributes mapped, used by seal/freeze.
    pub fn map_attributes(
        &self,
        from: &Rc<Shape>,
        f: impl Fn(PropertyAttributes) -> PropertyAttributes,
    ) -> Rc<Shape> {
        let mut shape = self.root();
        for record in from.records() {
            shape = self.transition(&shape, record.key, f(record.attributes));
        }
        shape
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
