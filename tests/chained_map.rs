// ChainedMap integration suite.
//
// The core invariants exercised:
// - Rehash: a new key arriving at `threshold`, or any entry_or_default
//   call there, grows the map first (below 8 -> 16, else double) without
//   losing any entry.
// - Lookup: find/value_of/get agree; misses never insert.
// - Traversal: one logical order across sparse chains, both directions.
// - Equality ignores capacity and chain layout.
use chained_collections::{ChainedMap, ContainerError, MapConfig, DEFAULT_LOAD_FACTOR};

// Test: concrete rehash scenario.
// Assumes: capacity 4 and load factor 0.75 give threshold 3.
// Verifies: three inserts keep capacity 4; the fourth rehashes to 16 and
// every key remains findable.
#[test]
fn rehash_on_fourth_key() {
    let mut m: ChainedMap<String, i32> = ChainedMap::with_capacity_and_load_factor(4, 0.75).unwrap();
    for k in ["a", "b", "c"] {
        *m.entry_or_default(k.to_string()) += 1;
    }
    assert_eq!(m.len(), 3);
    assert_eq!(m.capacity(), 4);
    *m.entry_or_default("d".to_string()) += 1;
    assert_eq!(m.capacity(), 16);
    for k in ["a", "b", "c", "d"] {
        assert_eq!(m.value_of(k), Ok(&1));
        assert!(!m.find(k).is_end());
    }
}

// Test: forced rehash preserves every pair.
// Verifies: inserting threshold + 1 distinct keys keeps all key/value pairs.
#[test]
fn forced_rehash_keeps_all_pairs() {
    let config = MapConfig::default().with_capacity(10).with_load_factor(0.5);
    let mut m: ChainedMap<usize, String> = ChainedMap::with_config(config).unwrap();
    let n = m.threshold() + 1;
    for i in 0..n {
        m.insert(i, format!("v{i}"));
    }
    assert_eq!(m.capacity(), 20);
    assert_eq!(m.len(), n);
    for i in 0..n {
        assert_eq!(m.get(&i).map(String::as_str), Some(format!("v{i}").as_str()));
    }
}

// Test: configuration errors surface at construction.
#[test]
fn invalid_configuration() {
    assert_eq!(
        ChainedMap::<u8, u8>::with_capacity_and_load_factor(4, 0.0).err(),
        Some(ContainerError::InvalidLoadFactor(0.0))
    );
    let m: ChainedMap<u8, u8> = ChainedMap::default();
    assert_eq!(m.load_factor(), DEFAULT_LOAD_FACTOR);
    assert_eq!(m.capacity(), 0);
}

// Test: misses.
// Verifies: value_of/remove report KeyNotFound; find returns end(); none
// of them insert.
#[test]
fn misses_do_not_insert() {
    let mut m: ChainedMap<String, i32> = ChainedMap::new();
    assert_eq!(m.value_of("x"), Err(ContainerError::KeyNotFound));
    assert_eq!(m.value_of_mut("x"), Err(ContainerError::KeyNotFound));
    assert_eq!(m.remove("x"), Err(ContainerError::KeyNotFound));
    assert_eq!(m.find("x"), m.end());
    assert_eq!(m.len(), 0);
    assert_eq!(m.capacity(), 0);
}

// Test: traversal over sparse chains.
// Verifies: forward and backward walks agree and cover every entry once.
#[test]
fn traversal_both_directions() {
    let mut m: ChainedMap<u64, u64> = ChainedMap::with_capacity_and_load_factor(64, 0.75).unwrap();
    for i in 0..5u64 {
        m.insert(i * 1000, i);
    }
    let forward: Vec<u64> = m.iter().map(|(k, _)| *k).collect();
    let mut c = m.cend();
    let mut backward = vec![];
    while c.move_prev().is_ok() {
        backward.push(*c.get().unwrap().0);
    }
    backward.reverse();
    assert_eq!(forward, backward);
    assert_eq!(forward.len(), 5);
    assert_eq!(c.position(), m.begin());
}

// Test: equality and clone.
#[test]
fn equality_and_clone() {
    let a: ChainedMap<&str, i32> = ChainedMap::from([("x", 1), ("y", 2)]);
    let mut b: ChainedMap<&str, i32> = ChainedMap::with_capacity_and_load_factor(3, 4.0).unwrap();
    b.insert("y", 2);
    b.insert("x", 1);
    assert_eq!(a, b);
    let mut c = a.clone();
    assert_eq!(c, a);
    c.insert("z", 3);
    assert_ne!(c, a);
    assert_eq!(a.len(), 2);
}

// Test: removal by position and through the mutable cursor.
#[test]
fn removal_by_position() {
    let mut m: ChainedMap<i32, i32> = (0..6).map(|i| (i, -i)).collect();
    let p = m.find(&4);
    assert_eq!(m.remove_at(p), Ok((4, -4)));
    assert_eq!(m.remove_at(p), Err(ContainerError::ForeignPosition));
    {
        let mut c = m.begin_mut();
        while !c.is_end() {
            if *c.get().unwrap().0 % 2 == 0 {
                c.remove_current().unwrap();
            } else {
                c.move_next().unwrap();
            }
        }
    }
    let mut keys: Vec<i32> = m.keys().copied().collect();
    keys.sort();
    assert_eq!(keys, vec![1, 3, 5]);
}

// Test: human-readable dump.
#[test]
fn describe_dump() {
    let mut m: ChainedMap<&str, i32> = ChainedMap::with_capacity_and_load_factor(1, 1.0).unwrap();
    m.insert("key", 5);
    assert_eq!(m.describe(), "Size: 1 Capacity: 1\nKey: key Value: 5\n");
    assert_eq!(format!("{:?}", m), r#"{"key": 5}"#);
}
