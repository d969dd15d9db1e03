//! LinkedSequence: doubly linked ring closed by an embedded sentinel.
//!
//! Nodes live in a `SlotMap` and are owned through their generational
//! keys; `next`/`prev` are plain key links, so no node is ever reached
//! through a dangling pointer. The sentinel is not a slot: it is the
//! `Sentinel` field of the sequence itself, and `Link::Sentinel` stands
//! for it inside the ring. An empty sequence's sentinel links to itself.
//!
//! Invariants
//! - For every adjacent pair `(a, b)` in the ring, `next(a) == b` and
//!   `prev(b) == a`, the sentinel included.
//! - `len` equals the number of nodes reachable from the sentinel.
//! - A node is unlinked from the ring before its value is dropped, so a
//!   panicking destructor never leaves a half-linked ring.

use crate::error::{ContainerError, Result};
use crate::origin::Origin;
use core::fmt;
use core::iter::FusedIterator;
use core::mem;
use slotmap::{DefaultKey, SecondaryMap, SlotMap};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum Link {
    Sentinel,
    Node(DefaultKey),
}

struct Node<T> {
    value: T,
    next: Link,
    prev: Link,
}

#[derive(Copy, Clone, Debug)]
struct Sentinel {
    next: Link,
    prev: Link,
}

impl Sentinel {
    const SELF_LINKED: Sentinel = Sentinel {
        next: Link::Sentinel,
        prev: Link::Sentinel,
    };
}

pub struct LinkedSequence<T> {
    nodes: SlotMap<DefaultKey, Node<T>>,
    sentinel: Sentinel,
    len: usize,
    origin: Origin,
}

/// A checked marker for a node of a `LinkedSequence`, or its `end()`.
///
/// Positions carry the node's generational key: once the node is removed
/// the position is reported as foreign instead of aliasing a later node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    origin: Origin,
    link: Link,
}

impl Position {
    pub fn is_end(&self) -> bool {
        self.link == Link::Sentinel
    }

    pub fn value<'a, T>(&self, seq: &'a LinkedSequence<T>) -> Result<&'a T> {
        let key = seq.live_key(*self)?;
        Ok(&seq.nodes[key].value)
    }

    pub fn value_mut<'a, T>(&self, seq: &'a mut LinkedSequence<T>) -> Result<&'a mut T> {
        let key = seq.live_key(*self)?;
        Ok(&mut seq.nodes[key].value)
    }

    pub fn next<T>(&self, seq: &LinkedSequence<T>) -> Result<Position> {
        let link = seq.owned_link(*self)?;
        Ok(seq.position(seq.step_forward(link)?))
    }

    pub fn prev<T>(&self, seq: &LinkedSequence<T>) -> Result<Position> {
        let link = seq.owned_link(*self)?;
        Ok(seq.position(seq.step_backward(link)?))
    }

    /// Walk `d` nodes (backwards when negative); fails if the walk would
    /// leave `[begin, end]`.
    pub fn offset<T>(&self, seq: &LinkedSequence<T>, d: isize) -> Result<Position> {
        let link = seq.owned_link(*self)?;
        Ok(seq.position(seq.walk(link, d)?))
    }
}

impl<T> LinkedSequence<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            sentinel: Sentinel::SELF_LINKED,
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

    fn next_of(&self, link: Link) -> Link {
        match link {
            Link::Sentinel => self.sentinel.next,
            Link::Node(k) => self.nodes[k].next,
        }
    }

    fn prev_of(&self, link: Link) -> Link {
        match link {
            Link::Sentinel => self.sentinel.prev,
            Link::Node(k) => self.nodes[k].prev,
        }
    }

    fn set_next(&mut self, link: Link, to: Link) {
        match link {
            Link::Sentinel => self.sentinel.next = to,
            Link::Node(k) => self.nodes[k].next = to,
        }
    }

    fn set_prev(&mut self, link: Link, to: Link) {
        match link {
            Link::Sentinel => self.sentinel.prev = to,
            Link::Node(k) => self.nodes[k].prev = to,
        }
    }

    /// Splice a new node holding `value` immediately before `at`.
    fn link_before(&mut self, at: Link, value: T) -> DefaultKey {
        let before = self.prev_of(at);
        let key = self.nodes.insert(Node {
            value,
            next: at,
            prev: before,
        });
        self.set_next(before, Link::Node(key));
        self.set_prev(at, Link::Node(key));
        self.len += 1;
        key
    }

    /// Detach node `key` from the ring and hand back its value.
    fn unlink(&mut self, key: DefaultKey) -> T {
        let Node { value, next, prev } = self
            .nodes
            .remove(key)
            .expect("linked node must be present in storage");
        self.set_next(prev, next);
        self.set_prev(next, prev);
        self.len -= 1;
        value
    }

    fn position(&self, link: Link) -> Position {
        Position {
            origin: self.origin,
            link,
        }
    }

    /// Validate ownership and liveness; `end()` is accepted.
    fn owned_link(&self, pos: Position) -> Result<Link> {
        if pos.origin != self.origin {
            return Err(ContainerError::ForeignPosition);
        }
        match pos.link {
            Link::Node(k) if !self.nodes.contains_key(k) => Err(ContainerError::ForeignPosition),
            link => Ok(link),
        }
    }

    /// Validate and require a real node.
    fn live_key(&self, pos: Position) -> Result<DefaultKey> {
        match self.owned_link(pos)? {
            Link::Sentinel => Err(ContainerError::OutOfBounds),
            Link::Node(k) => Ok(k),
        }
    }

    fn step_forward(&self, link: Link) -> Result<Link> {
        match link {
            Link::Sentinel => Err(ContainerError::OutOfBounds),
            node => Ok(self.next_of(node)),
        }
    }

    fn step_backward(&self, link: Link) -> Result<Link> {
        if link == self.sentinel.next {
            return Err(ContainerError::OutOfBounds);
        }
        Ok(self.prev_of(link))
    }

    fn walk(&self, mut link: Link, d: isize) -> Result<Link> {
        for _ in 0..d.unsigned_abs() {
            link = if d > 0 {
                self.step_forward(link)?
            } else {
                self.step_backward(link)?
            };
        }
        Ok(link)
    }

    /// O(1) push at the tail.
    pub fn append(&mut self, value: T) {
        self.link_before(Link::Sentinel, value);
    }

    /// O(1) push at the head.
    pub fn prepend(&mut self, value: T) {
        let head = self.sentinel.next;
        self.link_before(head, value);
    }

    /// Splice `value` in before `pos` (`end()` appends) and return its position.
    pub fn insert(&mut self, pos: Position, value: T) -> Result<Position> {
        let at = self.owned_link(pos)?;
        let key = self.link_before(at, value);
        Ok(self.position(Link::Node(key)))
    }

    pub fn pop_first(&mut self) -> Result<T> {
        match self.sentinel.next {
            Link::Sentinel => Err(ContainerError::Empty),
            Link::Node(k) => Ok(self.unlink(k)),
        }
    }

    pub fn pop_last(&mut self) -> Result<T> {
        match self.sentinel.prev {
            Link::Sentinel => Err(ContainerError::Empty),
            Link::Node(k) => Ok(self.unlink(k)),
        }
    }

    /// Unlink and drop the node at `pos`.
    pub fn erase(&mut self, pos: Position) -> Result<()> {
        let link = self.owned_link(pos)?;
        if self.len == 0 {
            return Err(ContainerError::Empty);
        }
        let Link::Node(key) = link else {
            return Err(ContainerError::OutOfBounds);
        };
        let removed = self.unlink(key);
        drop(removed);
        Ok(())
    }

    /// Unlink and drop every node in `[first, last)`.
    ///
    /// The range is validated before anything is touched: `last` must be
    /// reachable from `first` without passing `end()`.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Result<()> {
        let start = self.owned_link(first)?;
        let stop = self.owned_link(last)?;
        if start == stop {
            return Ok(());
        }
        let mut doomed = Vec::new();
        let mut cur = start;
        while cur != stop {
            match cur {
                Link::Sentinel => return Err(ContainerError::OutOfBounds),
                Link::Node(k) => {
                    doomed.push(k);
                    cur = self.nodes[k].next;
                }
            }
        }

        // Reconnect around the range, then free its nodes.
        let before = self.prev_of(start);
        self.set_next(before, stop);
        self.set_prev(stop, before);
        self.len -= doomed.len();
        for k in doomed {
            drop(self.nodes.remove(k));
        }
        Ok(())
    }

    /// Drop every node, resetting the sentinel to the self-linked state.
    pub fn clear(&mut self) {
        self.sentinel = Sentinel::SELF_LINKED;
        self.len = 0;
        self.nodes.clear();
    }

    /// Move the whole ring out in O(1), leaving `self` empty.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    pub fn first(&self) -> Option<&T> {
        match self.sentinel.next {
            Link::Sentinel => None,
            Link::Node(k) => Some(&self.nodes[k].value),
        }
    }

    pub fn last(&self) -> Option<&T> {
        match self.sentinel.prev {
            Link::Sentinel => None,
            Link::Node(k) => Some(&self.nodes[k].value),
        }
    }

    pub fn first_mut(&mut self) -> Option<&mut T> {
        match self.sentinel.next {
            Link::Sentinel => None,
            Link::Node(k) => Some(&mut self.nodes[k].value),
        }
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        match self.sentinel.prev {
            Link::Sentinel => None,
            Link::Node(k) => Some(&mut self.nodes[k].value),
        }
    }

    pub fn begin(&self) -> Position {
        self.position(self.sentinel.next)
    }

    pub fn end(&self) -> Position {
        self.position(Link::Sentinel)
    }

    pub fn cursor(&self, pos: Position) -> Result<Cursor<'_, T>> {
        let link = self.owned_link(pos)?;
        Ok(Cursor { seq: self, link })
    }

    pub fn cursor_mut(&mut self, pos: Position) -> Result<CursorMut<'_, T>> {
        let link = self.owned_link(pos)?;
        Ok(CursorMut { seq: self, link })
    }

    pub fn cbegin(&self) -> Cursor<'_, T> {
        Cursor {
            link: self.sentinel.next,
            seq: self,
        }
    }

    pub fn cend(&self) -> Cursor<'_, T> {
        Cursor {
            link: Link::Sentinel,
            seq: self,
        }
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        let link = self.sentinel.next;
        CursorMut { seq: self, link }
    }

    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            seq: self,
            link: Link::Sentinel,
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            seq: self,
            front: self.sentinel.next,
            back: self.sentinel.prev,
            remaining: self.len,
        }
    }

    /// Mutable iteration in ring order.
    ///
    /// Slot storage order differs from ring order, so the nodes are first
    /// borrowed by key and then handed out following the `next` links.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let mut by_key: SecondaryMap<DefaultKey, &mut Node<T>> =
            SecondaryMap::with_capacity(self.nodes.len());
        for (k, node) in self.nodes.iter_mut() {
            by_key.insert(k, node);
        }
        let mut ordered = Vec::with_capacity(self.len);
        let mut cur = self.sentinel.next;
        while let Link::Node(k) = cur {
            let node = by_key
                .remove(k)
                .expect("ring visits every node exactly once");
            cur = node.next;
            ordered.push(&mut node.value);
        }
        IterMut {
            it: ordered.into_iter(),
        }
    }
}

impl<T> Default for LinkedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for LinkedSequence<T> {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        for v in self.iter() {
            out.append(v.clone());
        }
        out
    }
}

impl<T> FromIterator<T> for LinkedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

impl<T, const N: usize> From<[T; N]> for LinkedSequence<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> Extend<T> for LinkedSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.append(v);
        }
    }
}

impl<T: PartialEq> PartialEq for LinkedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for LinkedSequence<T> {}

impl<T: fmt::Debug> fmt::Debug for LinkedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Read-only bidirectional cursor.
pub struct Cursor<'a, T> {
    seq: &'a LinkedSequence<T>,
    link: Link,
}

impl<'a, T> Cursor<'a, T> {
    pub fn position(&self) -> Position {
        self.seq.position(self.link)
    }

    pub fn is_end(&self) -> bool {
        self.link == Link::Sentinel
    }

    pub fn get(&self) -> Result<&'a T> {
        match self.link {
            Link::Sentinel => Err(ContainerError::OutOfBounds),
            Link::Node(k) => Ok(&self.seq.nodes[k].value),
        }
    }

    pub fn move_next(&mut self) -> Result<()> {
        self.link = self.seq.step_forward(self.link)?;
        Ok(())
    }

    pub fn move_prev(&mut self) -> Result<()> {
        self.link = self.seq.step_backward(self.link)?;
        Ok(())
    }

    /// Walk `d` nodes; on failure the cursor stays where it was.
    pub fn advance_by(&mut self, d: isize) -> Result<()> {
        self.link = self.seq.walk(self.link, d)?;
        Ok(())
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            link: self.link,
        }
    }
}

/// Mutable bidirectional cursor: the `Cursor` operations plus in-place
/// writes and O(1) splicing at the cursor.
pub struct CursorMut<'a, T> {
    seq: &'a mut LinkedSequence<T>,
    link: Link,
}

impl<'a, T> CursorMut<'a, T> {
    pub fn position(&self) -> Position {
        self.seq.position(self.link)
    }

    pub fn is_end(&self) -> bool {
        self.link == Link::Sentinel
    }

    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            seq: &*self.seq,
            link: self.link,
        }
    }

    pub fn into_cursor(self) -> Cursor<'a, T> {
        Cursor {
            seq: self.seq,
            link: self.link,
        }
    }

    pub fn get(&self) -> Result<&T> {
        self.as_cursor().get()
    }

    pub fn get_mut(&mut self) -> Result<&mut T> {
        match self.link {
            Link::Sentinel => Err(ContainerError::OutOfBounds),
            Link::Node(k) => Ok(&mut self.seq.nodes[k].value),
        }
    }

    pub fn move_next(&mut self) -> Result<()> {
        self.link = self.seq.step_forward(self.link)?;
        Ok(())
    }

    pub fn move_prev(&mut self) -> Result<()> {
        self.link = self.seq.step_backward(self.link)?;
        Ok(())
    }

    pub fn advance_by(&mut self, d: isize) -> Result<()> {
        self.link = self.seq.walk(self.link, d)?;
        Ok(())
    }

    /// Splice `value` in before the cursor; the cursor does not move.
    pub fn insert_before(&mut self, value: T) {
        self.seq.link_before(self.link, value);
    }

    /// Unlink the current node and return its value; the cursor moves to
    /// the following node.
    pub fn remove_current(&mut self) -> Result<T> {
        let Link::Node(k) = self.link else {
            return Err(ContainerError::OutOfBounds);
        };
        self.link = self.seq.nodes[k].next;
        Ok(self.seq.unlink(k))
    }
}

/// Iterator over shared references in ring order.
pub struct Iter<'a, T> {
    seq: &'a LinkedSequence<T>,
    front: Link,
    back: Link,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let Link::Node(k) = self.front else {
            return None;
        };
        let node = &self.seq.nodes[k];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let Link::Node(k) = self.back else {
            return None;
        };
        let node = &self.seq.nodes[k];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over mutable references in ring order.
pub struct IterMut<'a, T> {
    it: std::vec::IntoIter<&'a mut T>,
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

/// Owning iterator popping from either end.
pub struct IntoIter<T> {
    seq: LinkedSequence<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.seq.pop_first().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.seq.len, Some(self.seq.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.seq.pop_last().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for LinkedSequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { seq: self }
    }
}

impl<'a, T> IntoIterator for &'a LinkedSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut LinkedSequence<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
