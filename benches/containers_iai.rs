#[cfg(target_os = "linux")]
mod bench {
    use chained_collections::{ChainedMap, DynamicArray, LinkedSequence};
    use iai::black_box;

    const OPS: usize = 1_000;

    fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
        std::iter::from_fn(move || {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            Some(s)
        })
    }

    fn key(n: u64) -> String {
        format!("k{:016x}", n)
    }

    // Append 1k values, crossing every growth step up to 1024.
    pub fn array_append_1000_ops() {
        let mut a = DynamicArray::new();
        for i in 0..OPS as u64 {
            a.append(i);
        }
        black_box(a);
    }

    // Prepend 1k values; each one moves the contents into a fresh block.
    pub fn array_prepend_1000_ops() {
        let mut a = DynamicArray::new();
        for i in 0..OPS as u64 {
            a.prepend(i);
        }
        black_box(a);
    }

    // Alternate pushes at both ends of the ring.
    pub fn sequence_push_1000_ops() {
        let mut s = LinkedSequence::new();
        for i in 0..OPS as u64 {
            if i % 2 == 0 {
                s.append(i);
            } else {
                s.prepend(i);
            }
        }
        black_box(s);
    }

    // Insert 1k entries from empty, rehashing on the way.
    pub fn chained_map_insert_1000_ops() {
        let mut m = ChainedMap::<String, u64>::new();
        for (i, x) in lcg(1).take(OPS).enumerate() {
            m.insert(key(x), i as u64);
        }
        black_box(m);
    }

    // Repeated hits on existing keys.
    pub fn chained_map_find_hit_1000_ops() {
        let mut m = ChainedMap::new();
        let keys: Vec<_> = lcg(7).take(OPS * 2).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            m.insert(k.clone(), i as u64);
        }
        let mut it = keys.iter().cycle();
        for _ in 0..OPS {
            let k = it.next().unwrap();
            black_box(m.find(k));
        }
    }

    // Insert and remove the same key repeatedly.
    pub fn chained_map_remove_1000_ops() {
        let mut m = ChainedMap::new();
        for _ in 0..OPS {
            m.insert("k".to_string(), 1u64);
            black_box(m.remove("k").ok());
        }
    }
}

#[cfg(target_os = "linux")]
use bench::{
    array_append_1000_ops, array_prepend_1000_ops, chained_map_find_hit_1000_ops,
    chained_map_insert_1000_ops, chained_map_remove_1000_ops, sequence_push_1000_ops,
};

#[cfg(target_os = "linux")]
iai::main!(
    array_append_1000_ops,
    array_prepend_1000_ops,
    sequence_push_1000_ops,
    chained_map_insert_1000_ops,
    chained_map_find_hit_1000_ops,
    chained_map_remove_1000_ops
);

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("Skipping: iai benches require Linux/valgrind.");
}
