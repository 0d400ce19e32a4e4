//! Polymorphic indexed element storage.
//!
//! Every array owns one [`ElementArray`], a storage strategy chosen by the
//! history of writes it has seen. Fresh arrays start constant-empty; the
//! first write picks a contiguous scalar representation; widening values,
//! deletions and far-apart writes promote the storage along one-directional
//! edges:
//!
//! ```text
//! Empty ─┬─> Int ──> Double ──> Value
//!        │    │         │          │
//! Const ─┘    v         v          v
//!          HoleyInt HoleyDouble HoleyValue ──> Sparse
//! ```
//!
//! A storage never demotes, so code specialized on a kind stays valid until
//! the next promotion. Storage tracks which indices hold elements; the
//! array length lives with the array object and can exceed any index here.

mod constant;
mod dense;
mod holey;
mod sparse;

use std::collections::BTreeMap;
use std::rc::Rc;

pub use constant::{ConstantArray, ConstantEmptyArray};
pub use dense::DenseArray;
pub use holey::HoleyArray;
pub use sparse::SparseArray;

use crate::value::{as_int32, JsValue};

/// Largest run of new holes a contiguous or holey representation will
/// absorb before the write rewrites to sparse storage.
pub const MAX_GAP: u64 = 256;

/// Holey storage below this span never rewrites to sparse.
const SPARSE_MIN_SPAN: u64 = 64;

/// Discriminant of the active storage strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementsKind {
    Empty,
    Constant,
    Int,
    Double,
    Value,
    HoleyInt,
    HoleyDouble,
    HoleyValue,
    Sparse,
}

impl ElementsKind {
    /// True when every stored element is a number.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ElementsKind::Int
                | ElementsKind::Double
                | ElementsKind::HoleyInt
                | ElementsKind::HoleyDouble
        )
    }

    pub fn is_int(self) -> bool {
        matches!(self, ElementsKind::Int | ElementsKind::HoleyInt)
    }
}

/// Storage for the indexed elements of one array.
#[derive(Clone, Debug)]
pub enum ElementArray {
    Empty(ConstantEmptyArray),
    Constant(ConstantArray),
    Int(DenseArray<i32>),
    Double(DenseArray<f64>),
    Value(DenseArray<JsValue>),
    HoleyInt(HoleyArray<i32>),
    HoleyDouble(HoleyArray<f64>),
    HoleyValue(HoleyArray<JsValue>),
    Sparse(SparseArray),
}

/// How a number (or not) classifies for scalar storage.
enum Scalar {
    Int(i32),
    Double(f64),
    Other(JsValue),
}

fn classify(value: JsValue) -> Scalar {
    if let JsValue::Number(n) = value {
        if let Some(i) = as_int32(n) {
            return Scalar::Int(i);
        }
        return Scalar::Double(n);
    }
    Scalar::Other(value)
}

impl ElementArray {
    pub fn new_empty() -> Self {
        ElementArray::Empty(ConstantEmptyArray::new())
    }

    /// Storage for `Array.prototype` itself; a write through it revokes the
    /// realm assumption that the prototype has no elements.
    pub fn new_prototype_empty() -> Self {
        ElementArray::Empty(ConstantEmptyArray::for_prototype())
    }

    pub fn from_constant(items: Rc<[JsValue]>) -> Self {
        if items.is_empty() {
            Self::new_empty()
        } else {
            ElementArray::Constant(ConstantArray::new(items))
        }
    }

    /// Writable storage of the narrowest kind that fits every value.
    pub fn from_values(values: Vec<JsValue>) -> Self {
        if values.is_empty() {
            return Self::new_empty();
        }
        let mut all_int = true;
        let mut all_number = true;
        for value in &values {
            match value {
                JsValue::Number(n) => {
                    if as_int32(*n).is_none() {
                        all_int = false;
                    }
                }
                _ => {
                    all_int = false;
                    all_number = false;
                }
            }
        }
        if all_int {
            let items = values.iter().map(|v| int_of(v)).collect();
            ElementArray::Int(DenseArray::new(0, items))
        } else if all_number {
            let items = values.iter().map(JsValue::to_number).collect();
            ElementArray::Double(DenseArray::new(0, items))
        } else {
            ElementArray::Value(DenseArray::new(0, values))
        }
    }

    pub fn kind(&self) -> ElementsKind {
        match self {
            ElementArray::Empty(_) => ElementsKind::Empty,
            ElementArray::Constant(_) => ElementsKind::Constant,
            ElementArray::Int(_) => ElementsKind::Int,
            ElementArray::Double(_) => ElementsKind::Double,
            ElementArray::Value(_) => ElementsKind::Value,
            ElementArray::HoleyInt(_) => ElementsKind::HoleyInt,
            ElementArray::HoleyDouble(_) => ElementsKind::HoleyDouble,
            ElementArray::HoleyValue(_) => ElementsKind::HoleyValue,
            ElementArray::Sparse(_) => ElementsKind::Sparse,
        }
    }

    /// True for the constant-empty storage of `Array.prototype`.
    pub fn marks_prototype(&self) -> bool {
        matches!(self, ElementArray::Empty(empty) if empty.for_prototype)
    }

    pub fn has(&self, index: u64) -> bool {
        match self {
            ElementArray::Empty(_) => false,
            ElementArray::Constant(a) => a.has(index),
            ElementArray::Int(a) => a.has(index),
            ElementArray::Double(a) => a.has(index),
            ElementArray::Value(a) => a.has(index),
            ElementArray::HoleyInt(a) => a.has(index),
            ElementArray::HoleyDouble(a) => a.has(index),
            ElementArray::HoleyValue(a) => a.has(index),
            ElementArray::Sparse(a) => a.has(index),
        }
    }

    /// Element at `index`, or `None` for a hole or absent index.
    pub fn get(&self, index: u64) -> Option<JsValue> {
        match self {
            ElementArray::Empty(_) => None,
            ElementArray::Constant(a) => a.get(index).cloned(),
            ElementArray::Int(a) => a.get(index).map(|i| JsValue::Number(f64::from(*i))),
            ElementArray::Double(a) => a.get(index).map(|n| JsValue::Number(*n)),
            ElementArray::Value(a) => a.get(index).cloned(),
            ElementArray::HoleyInt(a) => a.get(index).map(|i| JsValue::Number(f64::from(*i))),
            ElementArray::HoleyDouble(a) => a.get(index).map(|n| JsValue::Number(*n)),
            ElementArray::HoleyValue(a) => a.get(index).cloned(),
            ElementArray::Sparse(a) => a.get(index).cloned(),
        }
    }

    /// Store `value` at `index`, promoting the representation as needed.
    pub fn set(&mut self, index: u64, value: JsValue) {
        match self {
            ElementArray::Empty(_) => {
                *self = fresh_storage(index, value);
            }
            ElementArray::Constant(constant) => {
                *self = materialize(constant.items());
                self.set(index, value);
            }
            ElementArray::Int(a) => match classify(value) {
                Scalar::Int(i) => {
                    if let Some(rewritten) = set_dense(a, index, i) {
                        *self = rewritten.map_int();
                    }
                }
                Scalar::Double(n) => {
                    *self = ElementArray::Double(int_to_double(a));
                    self.set(index, JsValue::Number(n));
                }
                Scalar::Other(v) => {
                    *self = ElementArray::Value(int_to_value(a));
                    self.set(index, v);
                }
            },
            ElementArray::Double(a) => match classify(value) {
                Scalar::Int(i) => {
                    if let Some(rewritten) = set_dense(a, index, f64::from(i)) {
                        *self = rewritten.map_double();
                    }
                }
                Scalar::Double(n) => {
                    if let Some(rewritten) = set_dense(a, index, n) {
                        *self = rewritten.map_double();
                    }
                }
                Scalar::Other(v) => {
                    *self = ElementArray::Value(double_to_value(a));
                    self.set(index, v);
                }
            },
            ElementArray::Value(a) => {
                if let Some(rewritten) = set_dense(a, index, value) {
                    *self = rewritten.map_value();
                }
            }
            ElementArray::HoleyInt(a) => match classify(value) {
                Scalar::Int(i) => {
                    if let Some(rewritten) = set_holey(a, index, i) {
                        *self = rewritten;
                    }
                }
                Scalar::Double(n) => {
                    *self = ElementArray::HoleyDouble(holey_int_to_double(a));
                    self.set(index, JsValue::Number(n));
                }
                Scalar::Other(v) => {
                    *self = ElementArray::HoleyValue(holey_int_to_value(a));
                    self.set(index, v);
                }
            },
            ElementArray::HoleyDouble(a) => match classify(value) {
                Scalar::Int(i) => {
                    if let Some(rewritten) = set_holey(a, index, f64::from(i)) {
                        *self = rewritten;
                    }
                }
                Scalar::Double(n) => {
                    if let Some(rewritten) = set_holey(a, index, n) {
                        *self = rewritten;
                    }
                }
                Scalar::Other(v) => {
                    *self = ElementArray::HoleyValue(holey_double_to_value(a));
                    self.set(index, v);
                }
            },
            ElementArray::HoleyValue(a) => {
                if let Some(rewritten) = set_holey(a, index, value) {
                    *self = rewritten;
                }
            }
            ElementArray::Sparse(a) => a.set(index, value),
        }
    }

    /// Remove the element at `index` if present. Interior deletions in a
    /// contiguous representation rewrite to the holey counterpart.
    pub fn delete(&mut self, index: u64) {
        match self {
            ElementArray::Empty(_) => {}
            ElementArray::Constant(constant) => {
                if constant.has(index) {
                    *self = materialize(constant.items());
                    self.delete(index);
                }
            }
            ElementArray::Int(a) => {
                if let Some(rewritten) = delete_dense(a, index) {
                    *self = ElementArray::HoleyInt(rewritten);
                }
            }
            ElementArray::Double(a) => {
                if let Some(rewritten) = delete_dense(a, index) {
                    *self = ElementArray::HoleyDouble(rewritten);
                }
            }
            ElementArray::Value(a) => {
                if let Some(rewritten) = delete_dense(a, index) {
                    *self = ElementArray::HoleyValue(rewritten);
                }
            }
            ElementArray::HoleyInt(a) => a.delete(index),
            ElementArray::HoleyDouble(a) => a.delete(index),
            ElementArray::HoleyValue(a) => a.delete(index),
            ElementArray::Sparse(a) => a.delete(index),
        }
    }

    /// Drop every element at or beyond `new_length`.
    pub fn truncate(&mut self, new_length: u64) {
        match self {
            ElementArray::Empty(_) => {}
            ElementArray::Constant(constant) => {
                if new_length < constant.len() {
                    *self = materialize(constant.items());
                    self.truncate(new_length);
                }
            }
            ElementArray::Int(a) => a.truncate(new_length),
            ElementArray::Double(a) => a.truncate(new_length),
            ElementArray::Value(a) => a.truncate(new_length),
            ElementArray::HoleyInt(a) => a.truncate(new_length),
            ElementArray::HoleyDouble(a) => a.truncate(new_length),
            ElementArray::HoleyValue(a) => a.truncate(new_length),
            ElementArray::Sparse(a) => a.truncate(new_length),
        }
    }

    pub fn first_index(&self) -> Option<u64> {
        match self {
            ElementArray::Empty(_) => None,
            ElementArray::Constant(a) => {
                if a.is_empty() {
                    None
                } else {
                    Some(0)
                }
            }
            ElementArray::Int(a) => a.first_index(),
            ElementArray::Double(a) => a.first_index(),
            ElementArray::Value(a) => a.first_index(),
            ElementArray::HoleyInt(a) => a.first_index(),
            ElementArray::HoleyDouble(a) => a.first_index(),
            ElementArray::HoleyValue(a) => a.first_index(),
            ElementArray::Sparse(a) => a.first_index(),
        }
    }

    pub fn last_index(&self) -> Option<u64> {
        match self {
            ElementArray::Empty(_) => None,
            ElementArray::Constant(a) => a.len().checked_sub(1),
            ElementArray::Int(a) => a.last_index(),
            ElementArray::Double(a) => a.last_index(),
            ElementArray::Value(a) => a.last_index(),
            ElementArray::HoleyInt(a) => a.last_index(),
            ElementArray::HoleyDouble(a) => a.last_index(),
            ElementArray::HoleyValue(a) => a.last_index(),
            ElementArray::Sparse(a) => a.last_index(),
        }
    }

    /// Smallest present index at or after `from`.
    pub fn next_index(&self, from: u64) -> Option<u64> {
        match self {
            ElementArray::Empty(_) => None,
            ElementArray::Constant(a) => {
                if from < a.len() {
                    Some(from)
                } else {
                    None
                }
            }
            ElementArray::Int(a) => a.next_index(from),
            ElementArray::Double(a) => a.next_index(from),
            ElementArray::Value(a) => a.next_index(from),
            ElementArray::HoleyInt(a) => a.next_index(from),
            ElementArray::HoleyDouble(a) => a.next_index(from),
            ElementArray::HoleyValue(a) => a.next_index(from),
            ElementArray::Sparse(a) => a.next_index(from),
        }
    }

    /// Largest present index at or before `from`.
    pub fn previous_index(&self, from: u64) -> Option<u64> {
        match self {
            ElementArray::Empty(_) => None,
            ElementArray::Constant(a) => {
                if a.is_empty() {
                    None
                } else {
                    Some(from.min(a.len() - 1))
                }
            }
            ElementArray::Int(a) => a.previous_index(from),
            ElementArray::Double(a) => a.previous_index(from),
            ElementArray::Value(a) => a.previous_index(from),
            ElementArray::HoleyInt(a) => a.previous_index(from),
            ElementArray::HoleyDouble(a) => a.previous_index(from),
            ElementArray::HoleyValue(a) => a.previous_index(from),
            ElementArray::Sparse(a) => a.previous_index(from),
        }
    }

    /// Number of indices that currently hold an element.
    pub fn element_count(&self) -> u64 {
        match self {
            ElementArray::Empty(_) => 0,
            ElementArray::Constant(a) => a.len(),
            ElementArray::Int(a) => a.len(),
            ElementArray::Double(a) => a.len(),
            ElementArray::Value(a) => a.len(),
            ElementArray::HoleyInt(a) => a.element_count(),
            ElementArray::HoleyDouble(a) => a.element_count(),
            ElementArray::HoleyValue(a) => a.element_count(),
            ElementArray::Sparse(a) => a.element_count(),
        }
    }

    /// True if any index below `length` holds no element.
    pub fn has_holes(&self, length: u64) -> bool {
        self.element_count() != length
    }

    /// Shift all elements at or above `at` up by `count`, opening a hole
    /// gap. Used by the blockwise splice and unshift paths.
    pub fn add_range(&mut self, at: u64, count: u64) {
        if count == 0 {
            return;
        }
        match self {
            ElementArray::Empty(_) => {}
            ElementArray::Constant(constant) => {
                if at < constant.len() {
                    *self = materialize(constant.items());
                    self.add_range(at, count);
                }
            }
            ElementArray::Int(a) => {
                if at <= a.offset {
                    a.shift_up(at, count);
                } else if at < a.end() {
                    let mut holey = dense_to_holey(a);
                    holey.shift_up(at, count);
                    *self = ElementArray::HoleyInt(holey);
                }
            }
            ElementArray::Double(a) => {
                if at <= a.offset {
                    a.shift_up(at, count);
                } else if at < a.end() {
                    let mut holey = dense_to_holey(a);
                    holey.shift_up(at, count);
                    *self = ElementArray::HoleyDouble(holey);
                }
            }
            ElementArray::Value(a) => {
                if at <= a.offset {
                    a.shift_up(at, count);
                } else if at < a.end() {
                    let mut holey = dense_to_holey(a);
                    holey.shift_up(at, count);
                    *self = ElementArray::HoleyValue(holey);
                }
            }
            ElementArray::HoleyInt(a) => a.shift_up(at, count),
            ElementArray::HoleyDouble(a) => a.shift_up(at, count),
            ElementArray::HoleyValue(a) => a.shift_up(at, count),
            ElementArray::Sparse(a) => a.shift_up(at, count),
        }
    }

    /// Remove indices in `[start, end)` and shift everything above down.
    /// Used by the blockwise splice and shift paths.
    pub fn remove_range(&mut self, start: u64, end: u64) {
        if start >= end {
            return;
        }
        match self {
            ElementArray::Empty(_) => {}
            ElementArray::Constant(constant) => {
                if start < constant.len() {
                    *self = materialize(constant.items());
                    self.remove_range(start, end);
                }
            }
            ElementArray::Int(a) => a.remove_range(start, end),
            ElementArray::Double(a) => a.remove_range(start, end),
            ElementArray::Value(a) => a.remove_range(start, end),
            ElementArray::HoleyInt(a) => a.remove_range(start, end),
            ElementArray::HoleyDouble(a) => a.remove_range(start, end),
            ElementArray::HoleyValue(a) => a.remove_range(start, end),
            ElementArray::Sparse(a) => a.remove_range(start, end),
        }
    }

    /// Every present (index, element) pair in ascending index order.
    pub fn to_entries(&self) -> Vec<(u64, JsValue)> {
        let mut entries = Vec::with_capacity(self.element_count() as usize);
        let mut cursor = self.first_index();
        while let Some(index) = cursor {
            if let Some(value) = self.get(index) {
                entries.push((index, value));
            }
            cursor = index.checked_add(1).and_then(|next| self.next_index(next));
        }
        entries
    }
}

fn int_of(value: &JsValue) -> i32 {
    match value {
        JsValue::Number(n) => as_int32(*n).unwrap_or(0),
        _ => 0,
    }
}

/// First write into constant-empty storage.
fn fresh_storage(index: u64, value: JsValue) -> ElementArray {
    match classify(value) {
        Scalar::Int(i) => ElementArray::Int(DenseArray::new(index, vec![i])),
        Scalar::Double(n) => ElementArray::Double(DenseArray::new(index, vec![n])),
        Scalar::Other(v) => ElementArray::Value(DenseArray::new(index, vec![v])),
    }
}

/// Writable copy of a constant snapshot, at the narrowest kind that fits.
fn materialize(items: &[JsValue]) -> ElementArray {
    ElementArray::from_values(items.to_vec())
}

/// Holey counterpart of a dense run, one kind at a time.
enum HoleyRewrite<T> {
    Holey(HoleyArray<T>),
    Sparse(SparseArray),
}

impl HoleyRewrite<i32> {
    fn map_int(self) -> ElementArray {
        match self {
            HoleyRewrite::Holey(a) => ElementArray::HoleyInt(a),
            HoleyRewrite::Sparse(a) => ElementArray::Sparse(a),
        }
    }
}

impl HoleyRewrite<f64> {
    fn map_double(self) -> ElementArray {
        match self {
            HoleyRewrite::Holey(a) => ElementArray::HoleyDouble(a),
            HoleyRewrite::Sparse(a) => ElementArray::Sparse(a),
        }
    }
}

impl HoleyRewrite<JsValue> {
    fn map_value(self) -> ElementArray {
        match self {
            HoleyRewrite::Holey(a) => ElementArray::HoleyValue(a),
            HoleyRewrite::Sparse(a) => ElementArray::Sparse(a),
        }
    }
}

/// Write into a dense run. Returns a rewrite when the write falls outside
/// the run by more than one slot.
fn set_dense<T>(a: &mut DenseArray<T>, index: u64, value: T) -> Option<HoleyRewrite<T>>
where
    T: Clone + IntoValue,
{
    if a.items.is_empty() {
        *a = DenseArray::new(index, vec![value]);
        return None;
    }
    if a.has(index) {
        a.set_in_range(index, value);
        return None;
    }
    if index == a.end() {
        a.push(value);
        return None;
    }
    if a.offset > 0 && index == a.offset - 1 {
        a.prepend(value);
        return None;
    }
    let gap = if index > a.end() {
        index - a.end()
    } else {
        a.offset - index
    };
    if gap > MAX_GAP {
        let mut sparse = to_sparse_from(a.offset, a.items.iter().cloned().map(Some));
        sparse.set(index, value.into_value());
        return Some(HoleyRewrite::Sparse(sparse));
    }
    let mut holey = dense_to_holey(a);
    holey.set(index, value);
    if holey.span() > SPARSE_MIN_SPAN && holey.hole_count() * 4 > holey.span() {
        return Some(HoleyRewrite::Sparse(to_sparse_from(
            holey.offset,
            holey.items.iter().cloned(),
        )));
    }
    Some(HoleyRewrite::Holey(holey))
}

/// Write into a holey span. Returns a rewrite when the resulting span turns
/// too thin or the write lands far outside it.
fn set_holey<T>(a: &mut HoleyArray<T>, index: u64, value: T) -> Option<ElementArray>
where
    T: Clone + IntoValue,
{
    let far = index + MAX_GAP < a.offset || index > a.end() + MAX_GAP;
    if far {
        let mut sparse = to_sparse_from(a.offset, a.items.iter().cloned());
        sparse.set(index, value.into_value());
        return Some(ElementArray::Sparse(sparse));
    }
    a.set(index, value);
    if a.span() > SPARSE_MIN_SPAN && a.hole_count() * 4 > a.span() {
        let sparse = to_sparse_from(a.offset, a.items.iter().cloned());
        return Some(ElementArray::Sparse(sparse));
    }
    None
}

/// Delete from a dense run. Edge deletions shrink the run; an interior
/// deletion returns the holey rewrite with the hole punched.
fn delete_dense<T: Clone>(a: &mut DenseArray<T>, index: u64) -> Option<HoleyArray<T>> {
    if !a.has(index) {
        return None;
    }
    if index == a.end() - 1 {
        a.items.pop();
        return None;
    }
    if index == a.offset {
        a.items.remove(0);
        a.offset += 1;
        return None;
    }
    let mut holey = dense_to_holey(a);
    holey.delete(index);
    Some(holey)
}

fn dense_to_holey<T: Clone>(a: &DenseArray<T>) -> HoleyArray<T> {
    HoleyArray::new(a.offset, a.items.iter().cloned().map(Some).collect())
}

fn int_to_double(a: &DenseArray<i32>) -> DenseArray<f64> {
    DenseArray::new(a.offset, a.items.iter().map(|i| f64::from(*i)).collect())
}

fn int_to_value(a: &DenseArray<i32>) -> DenseArray<JsValue> {
    DenseArray::new(
        a.offset,
        a.items
            .iter()
            .map(|i| JsValue::Number(f64::from(*i)))
            .collect(),
    )
}

fn double_to_value(a: &DenseArray<f64>) -> DenseArray<JsValue> {
    DenseArray::new(a.offset, a.items.iter().map(|n| JsValue::Number(*n)).collect())
}

fn holey_int_to_double(a: &HoleyArray<i32>) -> HoleyArray<f64> {
    HoleyArray::new(
        a.offset,
        a.items
            .iter()
            .map(|slot| slot.map(f64::from))
            .collect(),
    )
}

fn holey_int_to_value(a: &HoleyArray<i32>) -> HoleyArray<JsValue> {
    HoleyArray::new(
        a.offset,
        a.items
            .iter()
            .map(|slot| slot.map(|i| JsValue::Number(f64::from(i))))
            .collect(),
    )
}

fn holey_double_to_value(a: &HoleyArray<f64>) -> HoleyArray<JsValue> {
    HoleyArray::new(
        a.offset,
        a.items
            .iter()
            .map(|slot| slot.map(JsValue::Number))
            .collect(),
    )
}

fn to_sparse_from<T: IntoValue>(
    offset: u64,
    slots: impl Iterator<Item = Option<T>>,
) -> SparseArray {
    let mut items = BTreeMap::new();
    for (position, slot) in slots.enumerate() {
        if let Some(value) = slot {
            items.insert(offset + position as u64, value.into_value());
        }
    }
    SparseArray::new(items)
}

/// Scalar element to boxed value, for sparse rewrites.
trait IntoValue {
    fn into_value(self) -> JsValue;
}

impl IntoValue for i32 {
    fn into_value(self) -> JsValue {
        JsValue::Number(f64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> JsValue {
        JsValue::Number(self)
    }
}

impl IntoValue for JsValue {
    fn into_value(self) -> JsValue {
        self
    }
}
