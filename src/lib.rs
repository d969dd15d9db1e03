//! chained-collections: single-threaded generic containers that own their
//! storage outright and hand out checked positions instead of raw
//! iterators.
//!
//! Internal Design:
//!
//! Summary
//! - Containers:
//!   - DynamicArray<T>: contiguous, growable array over a raw storage
//!     block (`RawBuffer<T>`); the array alone decides which slots are
//!     live, and constructs, relocates and destroys values explicitly.
//!   - LinkedSequence<T>: doubly linked ring closed by a sentinel embedded
//!     in the sequence; nodes are owned through generational slot keys.
//!   - ChainedMap<K, V, S>: separate-chaining hash map; `capacity` chains
//!     of entries, rehashing when the entry count reaches
//!     `floor(capacity * load_factor)`.
//! - Every container offers a `Position` (a detached, copyable marker),
//!   a read-only `Cursor` and a `CursorMut`. `CursorMut` can do everything
//!   `Cursor` can (`as_cursor`) and adds in-place writes.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` through the origin brand carried by
//!   every container.
//! - Misuse is reported as `ContainerError`: stepping outside
//!   `[begin, end]`, popping an empty container, a missing key, a
//!   position from another container. A failing call leaves the container
//!   unchanged.
//! - Unchecked indexing (`array[i]`) panics on out-of-range, as `Vec` does.
//!
//! Positions and invalidation
//! - Positions are stamped with their container's `Origin`. Clones mint a
//!   fresh origin, so a position never silently moves between copies.
//! - List and map positions hold generational keys: once the element is
//!   removed the position reports `ForeignPosition` rather than aliasing
//!   a newer element. Array positions are plain indices and follow the
//!   usual index semantics after insertion or erasure.
//!
//! Hasher and rehashing invariants
//! - Each map entry stores its precomputed `u64` hash. Rehash and
//!   traversal use the stored hash, so `K: Hash` runs once per insertion
//!   and once per lookup, inside a debug-only reentrancy section.
//!
//! Non-goals
//! - Thread safety, allocator injection and persistence.

pub mod chained_map;
mod chained_map_proptest;
pub mod dynamic_array;
mod dynamic_array_proptest;
mod error;
pub mod linked_sequence;
mod linked_sequence_proptest;
mod origin;
mod raw_buffer;
mod reentrancy;

// Public surface
pub use chained_map::{ChainedMap, MapConfig, DEFAULT_LOAD_FACTOR, SEQUENCE_BOOTSTRAP_CAPACITY};
pub use dynamic_array::{DynamicArray, FIRST_ALLOCATION};
pub use error::{ContainerError, Result};
pub use linked_sequence::LinkedSequence;
