//! Sparse element storage.
//!
//! The fallback for arrays whose populated indices are far apart: an
//! ordered map from index to value. Every operation is O(log n) or a range
//! scan, which beats materializing gigabytes of holes.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::value::JsValue;

/// Ordered index-to-value map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseArray {
    pub(super) items: BTreeMap<u64, JsValue>,
}

impl SparseArray {
    pub fn new(items: BTreeMap<u64, JsValue>) -> Self {
        Self { items }
    }

    pub fn element_count(&self) -> u64 {
        self.items.len() as u64
    }

    pub fn has(&self, index: u64) -> bool {
        self.items.contains_key(&index)
    }

    pub fn get(&self, index: u64) -> Option<&JsValue> {
        self.items.get(&index)
    }

    pub fn set(&mut self, index: u64, value: JsValue) {
        self.items.insert(index, value);
    }

    pub fn delete(&mut self, index: u64) {
        self.items.remove(&index);
    }

    pub fn first_index(&self) -> Option<u64> {
        self.items.keys().next().copied()
    }

    pub fn last_index(&self) -> Option<u64> {
        self.items.keys().next_back().copied()
    }

    /// Smallest present index at or after `from`.
    pub fn next_index(&self, from: u64) -> Option<u64> {
        self.items
            .range((Bound::Included(from), Bound::Unbounded))
            .next()
            .map(|(index, _)| *index)
    }

    /// Largest present index at or before `from`.
    pub fn previous_index(&self, from: u64) -> Option<u64> {
        self.items
            .range((Bound::Unbounded, Bound::Included(from)))
            .next_back()
            .map(|(index, _)| *index)
    }

    /// Drop all elements at or beyond `new_length`.
    pub fn truncate(&mut self, new_length: u64) {
        self.items.split_off(&new_length);
    }

    /// Remove indices in `[start, end)` and shift everything above down.
    pub fn remove_range(&mut self, start: u64, end: u64) {
        let count = end - start;
        let moved: Vec<(u64, JsValue)> = self
            .items
            .split_off(&start)
            .into_iter()
            .filter(|(index, _)| *index >= end)
            .map(|(index, value)| (index - count, value))
            .collect();
        self.items.extend(moved);
    }

    /// Shift all elements at or above `at` up by `count`.
    pub fn shift_up(&mut self, at: u64, count: u64) {
        let moved: Vec<(u64, JsValue)> = self
            .items
            .split_off(&at)
            .into_iter()
            .map(|(index, value)| (index + count, value))
            .collect();
        self.items.extend(moved);
    }
}
