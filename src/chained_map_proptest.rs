#![cfg(test)]

// Property tests for ChainedMap against std::collections::HashMap, run with
// the default hasher and with a constant hasher that puts every key into a
// single chain.

use crate::chained_map::{ChainedMap, Position};
use crate::error::ContainerError;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Entry(usize, i32),
    Remove(usize),
    RemoveAt(usize),
    Find(usize),
    Contains(String),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Entry(i, d)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::RemoveAt),
            1 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S: BuildHasher>(
    mut sut: ChainedMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut stale: Vec<Position> = Vec::new();

    for op in ops {
        let cap_before = sut.capacity();
        let at_threshold = sut.len() == sut.threshold();
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let fresh = !model.contains_key(&k);
                prop_assert_eq!(sut.insert(k.clone(), v), model.insert(k, v));
                if fresh && at_threshold {
                    let first = if cap_before < 8 { 16 } else { cap_before * 2 };
                    prop_assert!(sut.capacity() >= first, "insert at threshold rehashes");
                } else {
                    prop_assert_eq!(sut.capacity(), cap_before);
                }
            }
            OpI::Entry(i, d) => {
                let k = key_from(pool, i);
                let slot = sut.entry_or_default(k.clone());
                *slot = slot.wrapping_add(d);
                let mv = model.entry(k).or_default();
                *mv = mv.wrapping_add(d);
                if at_threshold {
                    prop_assert!(sut.capacity() > cap_before, "entry at threshold rehashes");
                } else {
                    prop_assert_eq!(sut.capacity(), cap_before);
                }
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                match model.remove(&k) {
                    Some(v) => prop_assert_eq!(sut.remove(&k), Ok(v)),
                    None => prop_assert_eq!(sut.remove(&k), Err(ContainerError::KeyNotFound)),
                }
            }
            OpI::RemoveAt(i) => {
                let k = key_from(pool, i);
                let p = sut.find(&k);
                match model.remove(&k) {
                    Some(v) => {
                        prop_assert_eq!(sut.remove_at(p), Ok((k, v)));
                        stale.push(p);
                    }
                    None => {
                        prop_assert!(p.is_end());
                        prop_assert_eq!(sut.remove_at(p), Err(ContainerError::OutOfBounds));
                    }
                }
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let p = sut.find(&k);
                prop_assert_eq!(p.value(&sut).ok(), model.get(&k));
                if !p.is_end() {
                    prop_assert_eq!(p.key(&sut), Ok(&k));
                }
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
                prop_assert_eq!(sut.value_of(s.as_str()).is_ok(), has_model);
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
                prop_assert_eq!(sut.iter().count(), model.len());
            }
            OpI::Clear => {
                let first = sut.begin();
                if !first.is_end() {
                    stale.push(first);
                }
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap_before);
            }
        }

        for p in &stale {
            prop_assert_eq!(p.value(&sut), Err(ContainerError::ForeignPosition));
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.len() <= sut.threshold());
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
        let mut back: Vec<&Key> = sut.iter().rev().map(|(k, _)| k).collect();
        back.reverse();
        let forward: Vec<&Key> = sut.keys().collect();
        prop_assert_eq!(back, forward);
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `insert`/`entry_or_default`/`remove` agree with the model.
// - A new key arriving at the threshold rehashes by the growth rule; any
//   other insertion leaves capacity alone.
// - Forward and backward traversal visit the same entries in mirror order.
// - Positions of removed entries never resolve again.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ChainedMap::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher), starting from a small preset
// capacity and an unusual load factor. Load factors below 1/16 round the
// first thresholds down to zero and need several rehash rounds.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(), lf in prop_oneof![0.01f64..0.1, 0.1f64..3.0]) {
        let config = crate::chained_map::MapConfig::default().with_capacity(4).with_load_factor(lf);
        let sut = ChainedMap::with_config_and_hasher(config, ConstBuildHasher).expect("positive load factor");
        run_scenario(sut, &pool, ops)?;
    }
}

// Property: a map built from a sequence equals one built by incremental
// insertion in any order, and clones compare equal.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_equality_ignores_layout(entries in proptest::collection::vec((0u16..64, any::<i32>()), 0..50)) {
        let collected: ChainedMap<u16, i32> = entries.iter().copied().collect();
        let mut incremental: ChainedMap<u16, i32> = ChainedMap::new();
        let model: HashMap<u16, i32> = entries.iter().copied().collect();
        let mut keys: Vec<u16> = model.keys().copied().collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        for k in keys {
            incremental.insert(k, model[&k]);
        }
        prop_assert_eq!(&collected, &incremental);
        prop_assert_eq!(&collected.clone(), &collected);
        prop_assert_eq!(collected.len(), model.len());
    }
}
