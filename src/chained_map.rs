//! ChainedMap: separate-chaining hash map with load-factor driven rehash.
//!
//! Entries live in a `SlotMap` and are owned through generational keys.
//! Each of the `capacity` chains is a doubly linked run of entry keys
//! (`head`..`tail`); an entry records its own precomputed hash, so the
//! chain it belongs to is always `hash % capacity` and never needs to be
//! stored in a position.
//!
//! Invariants
//! - Every live entry is linked into exactly one chain, the one at
//!   `entry.hash % capacity`; keys are unique across the map.
//! - `capacity == 0` holds no chain storage and no entries.
//! - `threshold == floor(capacity * load_factor)`. An insertion of a new
//!   key finding `len == threshold` rehashes first, so the new entry is
//!   placed against the grown capacity.
//! - Calls into `K: Hash`/`K: Eq` and the hasher happen inside a debug
//!   reentrancy section.

use crate::error::{ContainerError, Result};
use crate::origin::Origin;
use crate::reentrancy::ReentrancyCheck;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::{DefaultKey, SecondaryMap, SlotMap};

pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Capacity a map built from a sequence of entries starts with; also the
/// capacity the first rehash of a small map grows to.
pub const SEQUENCE_BOOTSTRAP_CAPACITY: usize = 16;

/// Construction-time configuration of a `ChainedMap`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub capacity: usize,
    pub load_factor: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl MapConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// The load factor must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        if self.load_factor.is_finite() && self.load_factor > 0.0 {
            Ok(())
        } else {
            Err(ContainerError::InvalidLoadFactor(self.load_factor))
        }
    }
}

#[inline]
fn threshold_for(capacity: usize, load_factor: f64) -> usize {
    (capacity as f64 * load_factor).floor() as usize
}

#[inline]
fn chain_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    next: Option<DefaultKey>,
    prev: Option<DefaultKey>,
}

#[derive(Copy, Clone, Debug, Default)]
struct Chain {
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

pub struct ChainedMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    chains: Vec<Chain>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    load_factor: f64,
    threshold: usize,
    origin: Origin,
    reentrancy: ReentrancyCheck,
}

/// A checked marker for an entry of a `ChainedMap`, or its `end()`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    origin: Origin,
    entry: Option<DefaultKey>,
}

impl Position {
    pub fn is_end(&self) -> bool {
        self.entry.is_none()
    }

    pub fn key<'a, K, V, S>(&self, map: &'a ChainedMap<K, V, S>) -> Result<&'a K> {
        let k = map.live_entry(*self)?;
        Ok(&map.slots[k].key)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a ChainedMap<K, V, S>) -> Result<&'a V> {
        let k = map.live_entry(*self)?;
        Ok(&map.slots[k].value)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut ChainedMap<K, V, S>) -> Result<&'a mut V> {
        let k = map.live_entry(*self)?;
        Ok(&mut map.slots[k].value)
    }

    pub fn next<K, V, S>(&self, map: &ChainedMap<K, V, S>) -> Result<Position> {
        let at = map.owned_entry(*self)?;
        Ok(map.position(map.step_forward(at)?))
    }

    pub fn prev<K, V, S>(&self, map: &ChainedMap<K, V, S>) -> Result<Position> {
        let at = map.owned_entry(*self)?;
        Ok(map.position(map.step_backward(at)?))
    }

    pub fn offset<K, V, S>(&self, map: &ChainedMap<K, V, S>, d: isize) -> Result<Position> {
        let at = map.owned_entry(*self)?;
        Ok(map.position(map.walk(at, d)?))
    }
}

impl<K, V> ChainedMap<K, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    pub fn with_config(config: MapConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }

    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f64) -> Result<Self> {
        Self::with_config(MapConfig {
            capacity,
            load_factor,
        })
    }
}

impl<K, V, S> ChainedMap<K, V, S> {
    /// Empty map with capacity 0 and the default load factor.
    pub fn with_hasher(hasher: S) -> Self {
        Self::build(MapConfig::default(), hasher)
    }

    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        log::trace!(
            "chained map configured: capacity {} load factor {}",
            config.capacity,
            config.load_factor
        );
        Ok(Self::build(config, hasher))
    }

    fn build(config: MapConfig, hasher: S) -> Self {
        Self {
            hasher,
            chains: vec![Chain::default(); config.capacity],
            slots: SlotMap::with_key(),
            load_factor: config.load_factor,
            threshold: threshold_for(config.capacity, config.load_factor),
            origin: Origin::fresh(),
            reentrancy: ReentrancyCheck::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.chains.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Entry count at which the next new-key insertion, or any
    /// `entry_or_default`, rehashes.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drop every entry; capacity and load factor are kept.
    pub fn clear(&mut self) {
        self.chains.fill(Chain::default());
        self.slots.clear();
    }

    /// Move the contents out, leaving a default-configured empty map
    /// (capacity 0, `DEFAULT_LOAD_FACTOR`) that keeps a clone of the hasher.
    pub fn take(&mut self) -> Self
    where
        S: Clone,
    {
        let empty = Self::build(MapConfig::default(), self.hasher.clone());
        mem::replace(self, empty)
    }

    /// Link entry `k` at the front of its chain in `chains`.
    fn push_front(chains: &mut [Chain], slots: &mut SlotMap<DefaultKey, Entry<K, V>>, k: DefaultKey) {
        let idx = chain_index(slots[k].hash, chains.len());
        let head = chains[idx].head;
        {
            let e = &mut slots[k];
            e.prev = None;
            e.next = head;
        }
        match head {
            Some(h) => slots[h].prev = Some(k),
            None => chains[idx].tail = Some(k),
        }
        chains[idx].head = Some(k);
    }

    /// Detach entry `k` from its chain and free its slot.
    fn unlink(&mut self, k: DefaultKey) -> Entry<K, V> {
        let (prev, next, idx) = {
            let e = &self.slots[k];
            (e.prev, e.next, chain_index(e.hash, self.chains.len()))
        };
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.chains[idx].head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.chains[idx].tail = prev,
        }
        self.slots
            .remove(k)
            .expect("linked entry must be present in storage")
    }

    /// Grow to 16 chains below capacity 8, otherwise double, and relink
    /// every entry at the front of its new chain.
    fn rehash(&mut self) {
        let old_capacity = self.capacity();
        let new_capacity = if old_capacity < 8 {
            SEQUENCE_BOOTSTRAP_CAPACITY
        } else {
            old_capacity.checked_mul(2).expect("capacity overflow")
        };
        let order = self.ordered_keys();
        let mut chains = vec![Chain::default(); new_capacity];
        for k in order {
            Self::push_front(&mut chains, &mut self.slots, k);
        }
        self.chains = chains;
        self.threshold = threshold_for(new_capacity, self.load_factor);
        log::debug!(
            "chained map rehash: capacity {} -> {}, {} entries, threshold {}",
            old_capacity,
            new_capacity,
            self.len(),
            self.threshold
        );
    }

    /// Keys in iteration order: ascending chain index, then link order.
    fn ordered_keys(&self) -> Vec<DefaultKey> {
        let mut out = Vec::with_capacity(self.len());
        for chain in &self.chains {
            let mut cur = chain.head;
            while let Some(k) = cur {
                out.push(k);
                cur = self.slots[k].next;
            }
        }
        out
    }

    fn first_from(&self, chain: usize) -> Option<DefaultKey> {
        self.chains.get(chain..)?.iter().find_map(|c| c.head)
    }

    fn last_before(&self, chain: usize) -> Option<DefaultKey> {
        self.chains[..chain].iter().rev().find_map(|c| c.tail)
    }

    fn successor(&self, k: DefaultKey) -> Option<DefaultKey> {
        let e = &self.slots[k];
        e.next
            .or_else(|| self.first_from(chain_index(e.hash, self.capacity()) + 1))
    }

    fn predecessor(&self, at: Option<DefaultKey>) -> Option<DefaultKey> {
        match at {
            None => self.last_before(self.capacity()),
            Some(k) => {
                let e = &self.slots[k];
                e.prev
                    .or_else(|| self.last_before(chain_index(e.hash, self.capacity())))
            }
        }
    }

    fn step_forward(&self, at: Option<DefaultKey>) -> Result<Option<DefaultKey>> {
        match at {
            None => Err(ContainerError::OutOfBounds),
            Some(k) => Ok(self.successor(k)),
        }
    }

    fn step_backward(&self, at: Option<DefaultKey>) -> Result<Option<DefaultKey>> {
        self.predecessor(at)
            .map(Some)
            .ok_or(ContainerError::OutOfBounds)
    }

    fn walk(&self, mut at: Option<DefaultKey>, d: isize) -> Result<Option<DefaultKey>> {
        for _ in 0..d.unsigned_abs() {
            at = if d > 0 {
                self.step_forward(at)?
            } else {
                self.step_backward(at)?
            };
        }
        Ok(at)
    }

    fn position(&self, entry: Option<DefaultKey>) -> Position {
        Position {
            origin: self.origin,
            entry,
        }
    }

    /// Validate ownership and liveness; `end()` is accepted.
    fn owned_entry(&self, pos: Position) -> Result<Option<DefaultKey>> {
        if pos.origin != self.origin {
            return Err(ContainerError::ForeignPosition);
        }
        match pos.entry {
            Some(k) if !self.slots.contains_key(k) => Err(ContainerError::ForeignPosition),
            entry => Ok(entry),
        }
    }

    fn live_entry(&self, pos: Position) -> Result<DefaultKey> {
        self.owned_entry(pos)?.ok_or(ContainerError::OutOfBounds)
    }

    /// Unlink the entry at `pos` and return it.
    pub fn remove_at(&mut self, pos: Position) -> Result<(K, V)> {
        let k = self.live_entry(pos)?;
        let e = self.unlink(k);
        Ok((e.key, e.value))
    }

    pub fn begin(&self) -> Position {
        self.position(self.first_from(0))
    }

    pub fn end(&self) -> Position {
        self.position(None)
    }

    pub fn cursor(&self, pos: Position) -> Result<Cursor<'_, K, V, S>> {
        let entry = self.owned_entry(pos)?;
        Ok(Cursor { map: self, entry })
    }

    pub fn cursor_mut(&mut self, pos: Position) -> Result<CursorMut<'_, K, V, S>> {
        let entry = self.owned_entry(pos)?;
        Ok(CursorMut { map: self, entry })
    }

    pub fn cbegin(&self) -> Cursor<'_, K, V, S> {
        Cursor {
            entry: self.first_from(0),
            map: self,
        }
    }

    pub fn cend(&self) -> Cursor<'_, K, V, S> {
        Cursor {
            map: self,
            entry: None,
        }
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V, S> {
        let entry = self.first_from(0);
        CursorMut { map: self, entry }
    }

    pub fn end_mut(&mut self) -> CursorMut<'_, K, V, S> {
        CursorMut {
            map: self,
            entry: None,
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            map: self,
            front: self.first_from(0),
            back: self.last_before(self.capacity()),
            remaining: self.len(),
        }
    }

    /// Mutable iteration in chain order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let order = self.ordered_keys();
        let mut by_key: SecondaryMap<DefaultKey, &mut Entry<K, V>> =
            SecondaryMap::with_capacity(self.slots.len());
        for (k, e) in self.slots.iter_mut() {
            by_key.insert(k, e);
        }
        let mut ordered = Vec::with_capacity(order.len());
        for k in order {
            let Entry { key, value, .. } = by_key
                .remove(k)
                .expect("every chained entry is visited once");
            ordered.push((&*key, value));
        }
        IterMut {
            it: ordered.into_iter(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V, S> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V, S> {
        Values { inner: self.iter() }
    }

    /// Size and capacity header followed by one `Key: k Value: v` line per
    /// entry in iteration order.
    pub fn describe(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        use core::fmt::Write;
        let mut out = String::new();
        let _ = writeln!(out, "Size: {} Capacity: {}", self.len(), self.capacity());
        for (k, v) in self.iter() {
            let _ = writeln!(out, "Key: {} Value: {}", k, v);
        }
        out
    }
}

impl<K, V, S> ChainedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Hash `q` and scan its chain. Returns the hash and the matching entry.
    fn locate<Q>(&self, q: &Q, op: &'static str) -> (u64, Option<DefaultKey>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter(op);
        let hash = self.hasher.hash_one(q);
        if self.chains.is_empty() {
            return (hash, None);
        }
        let mut cur = self.chains[chain_index(hash, self.capacity())].head;
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash && e.key.borrow() == q {
                return (hash, Some(k));
            }
            cur = e.next;
        }
        (hash, None)
    }

    /// Rehash until the table has room for one more entry. A small load
    /// factor can need several rounds before `threshold` passes `len`.
    fn reserve_one(&mut self) {
        while self.len() >= self.threshold {
            self.rehash();
        }
    }

    /// Insert a key known to be absent, rehashing first at the threshold.
    fn insert_new(&mut self, key: K, value: V, hash: u64) -> DefaultKey {
        self.reserve_one();
        let k = self.slots.insert(Entry {
            key,
            value,
            hash,
            next: None,
            prev: None,
        });
        Self::push_front(&mut self.chains, &mut self.slots, k);
        k
    }

    /// Position of the entry for `q`, or `end()` when absent.
    pub fn find<Q>(&self, q: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (_, entry) = self.locate(q, "find");
        self.position(entry)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q, "contains_key").1.is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (_, entry) = self.locate(q, "get");
        entry.map(|k| &self.slots[k].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.locate(q, "get_mut").1?;
        Some(&mut self.slots[k].value)
    }

    /// Like `get`, but a miss is an error.
    pub fn value_of<Q>(&self, q: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(ContainerError::KeyNotFound)
    }

    pub fn value_of_mut<Q>(&mut self, q: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_mut(q).ok_or(ContainerError::KeyNotFound)
    }

    /// Mutable access to the value for `key`, inserting `V::default()` at
    /// the front of its chain when absent. The threshold check runs before
    /// the lookup, so a full table rehashes even when `key` is present.
    pub fn entry_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.reserve_one();
        let k = match self.locate(&key, "entry_or_default") {
            (_, Some(k)) => k,
            (hash, None) => self.insert_new(key, V::default(), hash),
        };
        &mut self.slots[k].value
    }

    /// Insert or replace; returns the previous value for an existing key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.locate(&key, "insert") {
            (_, Some(k)) => Some(mem::replace(&mut self.slots[k].value, value)),
            (hash, None) => {
                self.insert_new(key, value, hash);
                None
            }
        }
    }

    /// Unlink the entry for `q` and return its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.locate(q, "remove") {
            (_, Some(k)) => Ok(self.unlink(k).value),
            (_, None) => Err(ContainerError::KeyNotFound),
        }
    }
}

impl<K, V> Default for ChainedMap<K, V, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Clone for ChainedMap<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Same capacity, load factor and hasher; every entry is reinserted
    /// through the normal insert path.
    fn clone(&self) -> Self {
        let config = MapConfig {
            capacity: self.capacity(),
            load_factor: self.load_factor,
        };
        let mut out = Self::build(config, self.hasher.clone());
        for (k, v) in self.iter() {
            out.insert(k.clone(), v.clone());
        }
        out
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let config = MapConfig::default().with_capacity(SEQUENCE_BOOTSTRAP_CAPACITY);
        let mut out = Self::build(config, S::default());
        out.extend(iter);
        out
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ChainedMap<K, V, DefaultHashBuilder>
where
    K: Eq + Hash,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Equal when both hold the same keys with equal values; chain layout and
/// capacity are irrelevant.
impl<K, V, S> PartialEq for ChainedMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for ChainedMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ChainedMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Read-only bidirectional cursor over entries in chain order.
pub struct Cursor<'a, K, V, S> {
    map: &'a ChainedMap<K, V, S>,
    entry: Option<DefaultKey>,
}

impl<'a, K, V, S> Cursor<'a, K, V, S> {
    pub fn position(&self) -> Position {
        self.map.position(self.entry)
    }

    pub fn is_end(&self) -> bool {
        self.entry.is_none()
    }

    pub fn get(&self) -> Result<(&'a K, &'a V)> {
        let k = self.entry.ok_or(ContainerError::OutOfBounds)?;
        let e = &self.map.slots[k];
        Ok((&e.key, &e.value))
    }

    /// Step to the next entry, skipping empty chains.
    pub fn move_next(&mut self) -> Result<()> {
        self.entry = self.map.step_forward(self.entry)?;
        Ok(())
    }

    /// Step to the previous entry, scanning back over empty chains.
    pub fn move_prev(&mut self) -> Result<()> {
        self.entry = self.map.step_backward(self.entry)?;
        Ok(())
    }

    pub fn advance_by(&mut self, d: isize) -> Result<()> {
        self.entry = self.map.walk(self.entry, d)?;
        Ok(())
    }
}

impl<K, V, S> Clone for Cursor<'_, K, V, S> {
    fn clone(&self) -> Self {
        Self {
            map: self.map,
            entry: self.entry,
        }
    }
}

/// Mutable cursor: the `Cursor` operations plus value writes and removal.
pub struct CursorMut<'a, K, V, S> {
    map: &'a mut ChainedMap<K, V, S>,
    entry: Option<DefaultKey>,
}

impl<'a, K, V, S> CursorMut<'a, K, V, S> {
    pub fn position(&self) -> Position {
        self.map.position(self.entry)
    }

    pub fn is_end(&self) -> bool {
        self.entry.is_none()
    }

    pub fn as_cursor(&self) -> Cursor<'_, K, V, S> {
        Cursor {
            map: &*self.map,
            entry: self.entry,
        }
    }

    pub fn into_cursor(self) -> Cursor<'a, K, V, S> {
        Cursor {
            map: self.map,
            entry: self.entry,
        }
    }

    pub fn get(&self) -> Result<(&K, &V)> {
        self.as_cursor().get()
    }

    /// Keys stay immutable: changing one would break its chain placement.
    pub fn get_mut(&mut self) -> Result<(&K, &mut V)> {
        let k = self.entry.ok_or(ContainerError::OutOfBounds)?;
        let e = &mut self.map.slots[k];
        Ok((&e.key, &mut e.value))
    }

    pub fn move_next(&mut self) -> Result<()> {
        self.entry = self.map.step_forward(self.entry)?;
        Ok(())
    }

    pub fn move_prev(&mut self) -> Result<()> {
        self.entry = self.map.step_backward(self.entry)?;
        Ok(())
    }

    pub fn advance_by(&mut self, d: isize) -> Result<()> {
        self.entry = self.map.walk(self.entry, d)?;
        Ok(())
    }

    /// Unlink the current entry and move to the one that followed it.
    pub fn remove_current(&mut self) -> Result<(K, V)> {
        let k = self.entry.ok_or(ContainerError::OutOfBounds)?;
        self.entry = self.map.successor(k);
        let e = self.map.unlink(k);
        Ok((e.key, e.value))
    }
}

/// Iterator over `(&K, &V)` in chain order.
pub struct Iter<'a, K, V, S> {
    map: &'a ChainedMap<K, V, S>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let k = self.front?;
        self.front = self.map.successor(k);
        self.remaining -= 1;
        let e = &self.map.slots[k];
        Some((&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, S> DoubleEndedIterator for Iter<'_, K, V, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let k = self.back?;
        self.back = self.map.predecessor(Some(k));
        self.remaining -= 1;
        let e = &self.map.slots[k];
        Some((&e.key, &e.value))
    }
}

impl<K, V, S> ExactSizeIterator for Iter<'_, K, V, S> {}
impl<K, V, S> FusedIterator for Iter<'_, K, V, S> {}

/// Iterator over `(&K, &mut V)` in chain order.
pub struct IterMut<'a, K, V> {
    it: std::vec::IntoIter<(&'a K, &'a mut V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

pub struct Keys<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

impl<'a, K, V, S> Iterator for Keys<'a, K, V, S> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, S> ExactSizeIterator for Keys<'_, K, V, S> {}

pub struct Values<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

impl<'a, K, V, S> Iterator for Values<'a, K, V, S> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, S> ExactSizeIterator for Values<'_, K, V, S> {}

/// Owning iterator in chain order.
pub struct IntoIter<K, V> {
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    order: std::vec::IntoIter<DefaultKey>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let k = self.order.next()?;
        let e = self.slots.remove(k)?;
        Some((e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        let k = self.order.next_back()?;
        let e = self.slots.remove(k)?;
        Some((e.key, e.value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for ChainedMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        let order = self.ordered_keys();
        IntoIter {
            slots: self.slots,
            order: order.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Iter<'a, K, V, S> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
