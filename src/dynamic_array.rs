//! DynamicArray: contiguous growable sequence over a `RawBuffer`.
//!
//! Slots `[0, len)` of the buffer hold live values; `[len, capacity)` are
//! uninitialized. The first allocation reserves `FIRST_ALLOCATION` slots
//! and every growth doubles the capacity. Storage never shrinks.
//!
//! Positions are plain indices branded with the array's `Origin`. Any
//! reallocation (growth, `prepend`) invalidates them in the sense that
//! they may denote a different element afterwards; they are still checked
//! against the current length, so a stale position can never reach an
//! uninitialized slot.

use crate::error::{ContainerError, Result};
use crate::origin::Origin;
use crate::raw_buffer::RawBuffer;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::mem;
use core::ops::{Index, IndexMut};
use core::slice;

/// Slots reserved by the first allocation.
pub const FIRST_ALLOCATION: usize = 8;

pub struct DynamicArray<T> {
    buf: RawBuffer<T>,
    len: usize,
    origin: Origin,
}

/// A checked marker for a slot of a `DynamicArray`, `end()` included.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    origin: Origin,
    index: usize,
}

impl Position {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Signed number of steps from `self` to `other`.
    pub fn distance_to(&self, other: &Position) -> isize {
        other.index as isize - self.index as isize
    }

    pub fn value<'a, T>(&self, array: &'a DynamicArray<T>) -> Result<&'a T> {
        let index = array.live_index(*self)?;
        Ok(&array.as_slice()[index])
    }

    pub fn value_mut<'a, T>(&self, array: &'a mut DynamicArray<T>) -> Result<&'a mut T> {
        let index = array.live_index(*self)?;
        Ok(&mut array.as_mut_slice()[index])
    }

    pub fn next<T>(&self, array: &DynamicArray<T>) -> Result<Position> {
        array.step(*self, 1)
    }

    pub fn prev<T>(&self, array: &DynamicArray<T>) -> Result<Position> {
        array.step(*self, -1)
    }

    /// Position `d` slots away; fails if that leaves `[begin, end]`.
    pub fn offset<T>(&self, array: &DynamicArray<T>, d: isize) -> Result<Position> {
        array.step(*self, d)
    }
}

impl<T> DynamicArray<T> {
    pub fn new() -> Self {
        Self {
            buf: RawBuffer::empty(),
            len: 0,
            origin: Origin::fresh(),
        }
    }

    fn with_exact_capacity(cap: usize) -> Self {
        Self {
            buf: RawBuffer::allocate(cap),
            len: 0,
            origin: Origin::fresh(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [0, len) are live; the pointer is non-null and aligned.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` gives exclusive access.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    fn grown_capacity(&self) -> usize {
        match self.buf.capacity() {
            0 => FIRST_ALLOCATION,
            cap => cap.checked_mul(2).expect("capacity overflow"),
        }
    }

    /// Move every live value into a fresh block of `new_cap` slots, leaving
    /// slot `index` free for `value`, which is written there.
    fn reallocate_and_place(&mut self, new_cap: usize, index: usize, value: T) {
        debug_assert!(index <= self.len && new_cap > self.len);
        let old_cap = self.buf.capacity();
        let mut fresh = RawBuffer::allocate(new_cap);
        // SAFETY: [0, len) is live in the old block; the fresh block is
        // uninitialized and has room for len + 1 values.
        unsafe {
            self.buf.relocate_into(0, &mut fresh, 0, index);
            self.buf
                .relocate_into(index, &mut fresh, index + 1, self.len - index);
            fresh.write(index, value);
        }
        // The old block now holds no live values and is freed by `fresh`'s drop.
        self.buf.swap(&mut fresh);
        self.len += 1;
        log::trace!(
            "dynamic array reallocated: capacity {} -> {} ({} live)",
            old_cap,
            new_cap,
            self.len
        );
    }

    /// Amortized O(1) push at the tail.
    pub fn append(&mut self, value: T) {
        if self.len == self.buf.capacity() {
            let cap = self.grown_capacity();
            self.reallocate_and_place(cap, self.len, value);
        } else {
            // SAFETY: len < capacity and slot len is uninitialized.
            unsafe { self.buf.write(self.len, value) };
            self.len += 1;
        }
    }

    /// O(n) push at the head. Always moves the contents into a fresh block.
    pub fn prepend(&mut self, value: T) {
        let cap = if self.len == self.buf.capacity() {
            self.grown_capacity()
        } else {
            self.buf.capacity()
        };
        self.reallocate_and_place(cap, 0, value);
    }

    /// Insert `value` before `pos` and return the position of the new value.
    pub fn insert(&mut self, pos: Position, value: T) -> Result<Position> {
        let index = self.owned_index(pos)?;
        if index > self.len {
            return Err(ContainerError::OutOfBounds);
        }
        if self.len == self.buf.capacity() {
            let cap = self.grown_capacity();
            self.reallocate_and_place(cap, index, value);
        } else {
            // SAFETY: len < capacity, so shifting [index, len) right by one
            // stays in bounds and frees slot `index`.
            unsafe {
                self.buf.relocate(index, index + 1, self.len - index);
                self.buf.write(index, value);
            }
            self.len += 1;
        }
        Ok(self.position_at(index))
    }

    pub fn pop_first(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(ContainerError::Empty);
        }
        // SAFETY: slot 0 is live; the remaining values close the gap.
        let value = unsafe {
            let v = self.buf.read(0);
            self.buf.relocate(1, 0, self.len - 1);
            v
        };
        self.len -= 1;
        Ok(value)
    }

    pub fn pop_last(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(ContainerError::Empty);
        }
        self.len -= 1;
        // SAFETY: the slot at the old tail was live and is no longer counted.
        Ok(unsafe { self.buf.read(self.len) })
    }

    /// Remove and drop the value at `pos`.
    pub fn erase(&mut self, pos: Position) -> Result<()> {
        let index = self.owned_index(pos)?;
        if self.len == 0 {
            return Err(ContainerError::Empty);
        }
        if index >= self.len {
            return Err(ContainerError::OutOfBounds);
        }
        // SAFETY: slot `index` is live; the suffix moves left over it.
        let removed = unsafe {
            let v = self.buf.read(index);
            self.buf.relocate(index + 1, index, self.len - index - 1);
            v
        };
        self.len -= 1;
        drop(removed);
        Ok(())
    }

    /// Remove and drop the values in `[first, last)`.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Result<()> {
        let start = self.owned_index(first)?;
        let end = self.owned_index(last)?;
        if start > end || end > self.len {
            return Err(ContainerError::OutOfBounds);
        }
        if start == end {
            return Ok(());
        }
        let tail = self.len - end;
        // A panicking destructor leaks the tail instead of dropping it twice.
        self.len = start;
        // SAFETY: [start, end) and [end, end + tail) were live.
        unsafe {
            self.buf.drop_range(start, end);
            self.buf.relocate(end, start, tail);
        }
        self.len = start + tail;
        Ok(())
    }

    /// Drop every value, keeping the storage block.
    pub fn clear(&mut self) {
        let len = self.len;
        self.len = 0;
        // SAFETY: [0, len) was live and is no longer counted.
        unsafe { self.buf.drop_range(0, len) };
    }

    /// Move the contents out, leaving `self` empty with no storage.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    fn position_at(&self, index: usize) -> Position {
        Position {
            origin: self.origin,
            index,
        }
    }

    fn owned_index(&self, pos: Position) -> Result<usize> {
        if pos.origin != self.origin {
            return Err(ContainerError::ForeignPosition);
        }
        Ok(pos.index)
    }

    fn live_index(&self, pos: Position) -> Result<usize> {
        let index = self.owned_index(pos)?;
        if index >= self.len {
            return Err(ContainerError::OutOfBounds);
        }
        Ok(index)
    }

    fn step(&self, pos: Position, d: isize) -> Result<Position> {
        let index = self.owned_index(pos)?;
        match index.checked_add_signed(d) {
            Some(target) if target <= self.len && index <= self.len => Ok(self.position_at(target)),
            _ => Err(ContainerError::OutOfBounds),
        }
    }

    pub fn begin(&self) -> Position {
        self.position_at(0)
    }

    pub fn end(&self) -> Position {
        self.position_at(self.len)
    }

    /// Read-only cursor at `pos`.
    pub fn cursor(&self, pos: Position) -> Result<Cursor<'_, T>> {
        let index = self.owned_index(pos)?;
        if index > self.len {
            return Err(ContainerError::OutOfBounds);
        }
        Ok(Cursor { array: self, pos })
    }

    /// Mutable cursor at `pos`.
    pub fn cursor_mut(&mut self, pos: Position) -> Result<CursorMut<'_, T>> {
        let index = self.owned_index(pos)?;
        if index > self.len {
            return Err(ContainerError::OutOfBounds);
        }
        Ok(CursorMut { array: self, pos })
    }

    pub fn cbegin(&self) -> Cursor<'_, T> {
        Cursor {
            pos: self.begin(),
            array: self,
        }
    }

    pub fn cend(&self) -> Cursor<'_, T> {
        Cursor {
            pos: self.end(),
            array: self,
        }
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        let pos = self.begin();
        CursorMut { array: self, pos }
    }

    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        let pos = self.end();
        CursorMut { array: self, pos }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.as_slice().iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            it: self.as_mut_slice().iter_mut(),
        }
    }
}

impl<T: fmt::Display> DynamicArray<T> {
    /// Multi-line dump: a size/capacity header, then one numbered line per value.
    pub fn describe(&self) -> String {
        use core::fmt::Write;
        let mut out = String::new();
        let _ = writeln!(out, "Size: {} Capacity: {}", self.len, self.capacity());
        for (i, v) in self.iter().enumerate() {
            let _ = writeln!(out, "{}: {}", i, v);
        }
        out
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: [0, len) is live; the block itself is freed by RawBuffer.
        unsafe { self.buf.drop_range(0, self.len) };
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    fn clone(&self) -> Self {
        let mut out = Self::with_exact_capacity(self.len);
        for v in self.iter() {
            // SAFETY: the block was sized for self.len values.
            unsafe { out.buf.write(out.len, v.clone()) };
            out.len += 1;
        }
        out
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut out = Self::with_exact_capacity(iter.size_hint().0);
        out.extend(iter);
        out
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.append(v);
        }
    }
}

impl<T: PartialEq> PartialEq for DynamicArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: Hash> Hash for DynamicArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Index<usize> for DynamicArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for DynamicArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

/// Read-only bidirectional cursor.
pub struct Cursor<'a, T> {
    array: &'a DynamicArray<T>,
    pos: Position,
}

impl<'a, T> Cursor<'a, T> {
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn is_end(&self) -> bool {
        self.pos.index == self.array.len
    }

    pub fn get(&self) -> Result<&'a T> {
        self.pos.value(self.array)
    }

    pub fn move_next(&mut self) -> Result<()> {
        self.pos = self.array.step(self.pos, 1)?;
        Ok(())
    }

    pub fn move_prev(&mut self) -> Result<()> {
        self.pos = self.array.step(self.pos, -1)?;
        Ok(())
    }

    pub fn advance_by(&mut self, d: isize) -> Result<()> {
        self.pos = self.array.step(self.pos, d)?;
        Ok(())
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self {
            array: self.array,
            pos: self.pos,
        }
    }
}

/// Mutable bidirectional cursor; everything `Cursor` offers plus `get_mut`.
pub struct CursorMut<'a, T> {
    array: &'a mut DynamicArray<T>,
    pos: Position,
}

impl<'a, T> CursorMut<'a, T> {
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn is_end(&self) -> bool {
        self.pos.index == self.array.len
    }

    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            array: &*self.array,
            pos: self.pos,
        }
    }

    pub fn into_cursor(self) -> Cursor<'a, T> {
        Cursor {
            array: self.array,
            pos: self.pos,
        }
    }

    pub fn get(&self) -> Result<&T> {
        self.pos.value(&*self.array)
    }

    pub fn get_mut(&mut self) -> Result<&mut T> {
        self.pos.value_mut(self.array)
    }

    pub fn move_next(&mut self) -> Result<()> {
        self.pos = self.array.step(self.pos, 1)?;
        Ok(())
    }

    pub fn move_prev(&mut self) -> Result<()> {
        self.pos = self.array.step(self.pos, -1)?;
        Ok(())
    }

    pub fn advance_by(&mut self, d: isize) -> Result<()> {
        self.pos = self.array.step(self.pos, d)?;
        Ok(())
    }
}

/// Iterator over shared references.
pub struct Iter<'a, T> {
    it: slice::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over mutable references.
pub struct IterMut<'a, T> {
    it: slice::IterMut<'a, T>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator; values not yet yielded are dropped with it.
pub struct IntoIter<T> {
    buf: RawBuffer<T>,
    front: usize,
    back: usize,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;
    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: [front, back) is live.
        let v = unsafe { self.buf.read(self.front) };
        self.front += 1;
        Some(v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: the old back slot was live and is no longer counted.
        Some(unsafe { self.buf.read(self.back) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: [front, back) is still live.
        unsafe { self.buf.drop_range(self.front, self.back) };
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> IntoIter<T> {
        let back = self.len;
        self.len = 0;
        let buf = mem::replace(&mut self.buf, RawBuffer::empty());
        IntoIter { buf, front: 0, back }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
