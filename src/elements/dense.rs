//! Contiguous element storage.
//!
//! A dense array keeps its elements in one `Vec`, optionally starting at a
//! nonzero `offset` so that removing from the front (shift) and the first
//! write of a fresh array at a nonzero index both stay O(1) without
//! materializing leading holes. Indices below `offset` and at or beyond
//! `offset + items.len()` are absent.

/// Contiguous run of elements of one scalar kind.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseArray<T> {
    pub(super) offset: u64,
    pub(super) items: Vec<T>,
}

impl<T: Clone> DenseArray<T> {
    pub fn new(offset: u64, items: Vec<T>) -> Self {
        Self { offset, items }
    }

    pub fn len(&self) -> u64 {
        self.items.len() as u64
    }

    /// First absent index after the run.
    pub fn end(&self) -> u64 {
        self.offset + self.len()
    }

    pub fn has(&self, index: u64) -> bool {
        index >= self.offset && index < self.end()
    }

    pub fn get(&self, index: u64) -> Option<&T> {
        if self.has(index) {
            Some(&self.items[(index - self.offset) as usize])
        } else {
            None
        }
    }

    /// Overwrite an element already inside the run.
    pub fn set_in_range(&mut self, index: u64, value: T) {
        debug_assert!(self.has(index));
        self.items[(index - self.offset) as usize] = value;
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Grow the run downward by one; `index` must be `offset - 1`.
    pub fn prepend(&mut self, value: T) {
        debug_assert!(self.offset > 0);
        self.offset -= 1;
        self.items.insert(0, value);
    }

    pub fn first_index(&self) -> Option<u64> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.offset)
        }
    }

    pub fn last_index(&self) -> Option<u64> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.end() - 1)
        }
    }

    /// Smallest present index at or after `from`.
    pub fn next_index(&self, from: u64) -> Option<u64> {
        if self.items.is_empty() || from >= self.end() {
            None
        } else {
            Some(from.max(self.offset))
        }
    }

    /// Largest present index at or before `from`.
    pub fn previous_index(&self, from: u64) -> Option<u64> {
        if self.items.is_empty() || from < self.offset {
            None
        } else {
            Some(from.min(self.end() - 1))
        }
    }

    /// Drop all elements at or beyond `new_length`.
    pub fn truncate(&mut self, new_length: u64) {
        if new_length <= self.offset {
            self.items.clear();
            self.offset = new_length.min(self.offset);
        } else if new_length < self.end() {
            self.items.truncate((new_length - self.offset) as usize);
        }
    }

    /// Remove indices in `[start, end)` and shift everything above down.
    pub fn remove_range(&mut self, start: u64, end: u64) {
        let count = end - start;
        if end <= self.offset {
            self.offset -= count;
            return;
        }
        let cut_from = start.max(self.offset);
        let cut_to = end.min(self.end());
        if cut_from < cut_to {
            self.items
                .drain((cut_from - self.offset) as usize..(cut_to - self.offset) as usize);
        }
        if start < self.offset {
            self.offset = start;
        }
    }

    /// Shift the whole run up by `count`; `at` must not split the run.
    /// Interior insertion needs a holey rewrite first.
    pub fn shift_up(&mut self, at: u64, count: u64) {
        debug_assert!(at <= self.offset);
        let _ = at;
        self.offset += count;
    }
}
