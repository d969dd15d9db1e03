use chained_collections::{ChainedMap, MapConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(seed: u64, n: usize) -> (ChainedMap<String, u64>, Vec<String>) {
    let mut m = ChainedMap::new();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        m.insert(k.clone(), i as u64);
    }
    (m, keys)
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("chained::insert_fresh_100k", |b| {
        b.iter_batched(
            ChainedMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.insert(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

// Presized so no rehash happens inside the measured loop.
fn bench_insert_presized_100k(c: &mut Criterion) {
    c.bench_function("chained::insert_presized_100k", |b| {
        b.iter_batched(
            || {
                let config = MapConfig::default().with_capacity(262_144);
                ChainedMap::<String, u64>::with_config(config).unwrap()
            },
            |mut m| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    m.insert(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit_10k(c: &mut Criterion) {
    let (m, keys) = filled(7, 100_000);
    c.bench_function("chained::find_hit_10k", |b| {
        b.iter(|| {
            for k in keys.iter().take(10_000) {
                black_box(m.get(k));
            }
        })
    });
}

fn bench_find_miss_10k(c: &mut Criterion) {
    let (m, _) = filled(11, 100_000);
    let misses: Vec<String> = lcg(0xdead_beef).take(10_000).map(key).collect();
    c.bench_function("chained::find_miss_10k", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(m.contains_key(k));
            }
        })
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("chained::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || filled(2, 110_000),
            |(mut m, keys)| {
                for k in keys.iter().step_by(11) {
                    black_box(m.remove(k).ok());
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iter_and_iter_mut(c: &mut Criterion) {
    let (mut m, _) = filled(5, 100_000);
    c.bench_function("chained::iter_100k", |b| {
        b.iter(|| black_box(m.values().sum::<u64>()))
    });
    c.bench_function("chained::iter_mut_100k", |b| {
        b.iter(|| {
            for (_, v) in m.iter_mut() {
                *v = v.wrapping_add(1);
            }
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_presized_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_remove_random_10k,
              bench_find_hit_10k,
              bench_find_miss_10k,
              bench_iter_and_iter_mut
}
criterion_main!(benches_insert, benches_ops);
