//! Lazily computed per-shape property metadata.
//!
//! Enumeration-order property lists are expensive to build and identical for
//! every object sharing a shape, so they are computed once per shape id and
//! cached here. Two views exist and are filled independently: the full
//! record list in canonical order, and the enumerable string names. Asking
//! for one never forces the other.
//!
//! The cache map is guarded by a mutex and entries are computed while the
//! lock is held; a recompute racing with itself would produce the same
//! value, so holding the lock across the computation is the simple safe
//! choice.

use std::rc::Rc;
use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::shape::{PropertyRecord, Shape};
use crate::value::{JsString, PropertyKey};

#[derive(Default)]
struct Entry {
    sorted: Option<Rc<[PropertyRecord]>>,
    enumerable_names: Option<Rc<[JsString]>>,
}

/// Cache of derived property metadata, keyed by shape id. One per realm.
pub struct ShapeDataCache {
    entries: Mutex<FxHashMap<u64, Entry>>,
}

impl ShapeDataCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    /// All property records of `shape` in canonical order: integer-like
    /// string keys numerically ascending, then the remaining keys in
    /// insertion order.
    pub fn sorted_records(&self, shape: &Shape) -> Rc<[PropertyRecord]> {
        let mut entries = self.lock();
        let entry = entries.entry(shape.id()).or_default();
        if let Some(sorted) = &entry.sorted {
            return Rc::clone(sorted);
        }
        let sorted: Rc<[PropertyRecord]> = sort_records(shape.records()).into();
        entry.sorted = Some(Rc::clone(&sorted));
        sorted
    }

    /// Enumerable string property names of `shape`, in canonical order.
    /// Symbols and non-enumerable properties are excluded.
    pub fn enumerable_names(&self, shape: &Shape) -> Rc<[JsString]> {
        let mut entries = self.lock();
        let entry = entries.entry(shape.id()).or_default();
        if let Some(names) = &entry.enumerable_names {
            return Rc::clone(names);
        }
        let names: Vec<JsString> = sort_records(shape.records())
            .into_iter()
            .filter(|record| record.attributes.enumerable)
            .filter_map(|record| match record.key {
                PropertyKey::String(name) => Some(name),
                PropertyKey::Index(index) => Some(JsString::from(index.to_string())),
                PropertyKey::Symbol(_) => None,
            })
            .collect();
        let names: Rc<[JsString]> = names.into();
        entry.enumerable_names = Some(Rc::clone(&names));
        names
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<u64, Entry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            // Entries are idempotent pure functions of the shape, so a
            // poisoned lock still guards consistent data.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for ShapeDataCache {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_records(mut records: Vec<PropertyRecord>) -> Vec<PropertyRecord> {
    // Stable sort: integer-like keys first, numerically ascending; ties and
    // non-integer keys keep insertion order.
    records.sort_by_key(|record| match &record.key {
        PropertyKey::Index(index) => (0u8, u64::from(*index)),
        _ => (1u8, 0),
    });
    records
}
