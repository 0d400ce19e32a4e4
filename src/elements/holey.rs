//! Hole-aware element storage.
//!
//! A holey array stores a span of slots starting at `offset`, where each
//! slot either holds an element or a hole. The hole count is tracked so the
//! density check that drives the sparse rewrite is O(1). The first and last
//! slots are kept non-hole; `normalize` restores that after deletions.

/// Span of slots of one scalar kind with explicit holes.
#[derive(Clone, Debug, PartialEq)]
pub struct HoleyArray<T> {
    pub(super) offset: u64,
    pub(super) items: Vec<Option<T>>,
    pub(super) hole_count: u64,
}

impl<T: Clone> HoleyArray<T> {
    pub fn new(offset: u64, items: Vec<Option<T>>) -> Self {
        let hole_count = items.iter().filter(|slot| slot.is_none()).count() as u64;
        let mut array = Self {
            offset,
            items,
            hole_count,
        };
        array.normalize();
        array
    }

    /// Slots spanned, holes included.
    pub fn span(&self) -> u64 {
        self.items.len() as u64
    }

    /// First absent index after the span.
    pub fn end(&self) -> u64 {
        self.offset + self.span()
    }

    pub fn element_count(&self) -> u64 {
        self.span() - self.hole_count
    }

    pub fn hole_count(&self) -> u64 {
        self.hole_count
    }

    pub fn has(&self, index: u64) -> bool {
        self.get(index).is_some()
    }

    pub fn get(&self, index: u64) -> Option<&T> {
        if index < self.offset || index >= self.end() {
            return None;
        }
        self.items[(index - self.offset) as usize].as_ref()
    }

    /// Write a slot inside or adjacent to the span, filling any gap with
    /// holes. The caller checks the gap is acceptable beforehand.
    pub fn set(&mut self, index: u64, value: T) {
        if self.items.is_empty() {
            self.offset = index;
            self.items.push(Some(value));
            return;
        }
        if index < self.offset {
            let gap = (self.offset - index) as usize;
            let mut front: Vec<Option<T>> = Vec::with_capacity(gap + self.items.len());
            front.push(Some(value));
            front.extend(std::iter::repeat_with(|| None).take(gap - 1));
            front.append(&mut self.items);
            self.items = front;
            self.hole_count += gap as u64 - 1;
            self.offset = index;
        } else if index >= self.end() {
            let gap = (index - self.end()) as usize;
            self.items
                .extend(std::iter::repeat_with(|| None).take(gap));
            self.items.push(Some(value));
            self.hole_count += gap as u64;
        } else {
            let slot = &mut self.items[(index - self.offset) as usize];
            if slot.is_none() {
                self.hole_count -= 1;
            }
            *slot = Some(value);
        }
    }

    /// Punch a hole at `index` if an element is there.
    pub fn delete(&mut self, index: u64) {
        if index < self.offset || index >= self.end() {
            return;
        }
        let slot = &mut self.items[(index - self.offset) as usize];
        if slot.is_some() {
            *slot = None;
            self.hole_count += 1;
            self.normalize();
        }
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
        let start = from.max(self.offset);
        if start >= self.end() {
            return None;
        }
        self.items[(start - self.offset) as usize..]
            .iter()
            .position(|slot| slot.is_some())
            .map(|found| start + found as u64)
    }

    /// Largest present index at or before `from`.
    pub fn previous_index(&self, from: u64) -> Option<u64> {
        if self.items.is_empty() || from < self.offset {
            return None;
        }
        let stop = from.min(self.end() - 1);
        self.items[..=(stop - self.offset) as usize]
            .iter()
            .rposition(|slot| slot.is_some())
            .map(|found| self.offset + found as u64)
    }

    /// Drop all slots at or beyond `new_length`.
    pub fn truncate(&mut self, new_length: u64) {
        if new_length <= self.offset {
            self.items.clear();
            self.hole_count = 0;
            self.offset = 0;
        } else if new_length < self.end() {
            let keep = (new_length - self.offset) as usize;
            let dropped_holes = self.items[keep..]
                .iter()
                .filter(|slot| slot.is_none())
                .count() as u64;
            self.items.truncate(keep);
            self.hole_count -= dropped_holes;
            self.normalize();
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
            let removed_holes = self.items
                [(cut_from - self.offset) as usize..(cut_to - self.offset) as usize]
                .iter()
                .filter(|slot| slot.is_none())
                .count() as u64;
            self.items
                .drain((cut_from - self.offset) as usize..(cut_to - self.offset) as usize);
            self.hole_count -= removed_holes;
        }
        if start < self.offset {
            self.offset = start;
        }
        self.normalize();
    }

    /// Shift all elements at or above `at` up by `count`, leaving holes in
    /// the opened gap.
    pub fn shift_up(&mut self, at: u64, count: u64) {
        if at <= self.offset {
            self.offset += count;
        } else if at < self.end() {
            let split = (at - self.offset) as usize;
            let rest = self.items.split_off(split);
            self.items
                .extend(std::iter::repeat_with(|| None).take(count as usize));
            self.items.extend(rest);
            self.hole_count += count;
        }
    }

    /// Restore the no-hole-at-either-edge invariant.
    fn normalize(&mut self) {
        let leading = self
            .items
            .iter()
            .take_while(|slot| slot.is_none())
            .count();
        if leading == self.items.len() {
            self.items.clear();
            self.hole_count = 0;
            self.offset = 0;
            return;
        }
        if leading > 0 {
            self.items.drain(..leading);
            self.offset += leading as u64;
            self.hole_count -= leading as u64;
        }
        let trailing = self
            .items
            .iter()
            .rev()
            .take_while(|slot| slot.is_none())
            .count();
        if trailing > 0 {
            self.items.truncate(self.items.len() - trailing);
            self.hole_count -= trailing as u64;
        }
    }
}
