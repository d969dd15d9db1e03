use chained_collections::{DynamicArray, LinkedSequence};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn bench_array_append_100k(c: &mut Criterion) {
    c.bench_function("array::append_100k", |b| {
        b.iter_batched(
            DynamicArray::<u64>::new,
            |mut a| {
                for i in 0..100_000u64 {
                    a.append(i);
                }
                black_box(a)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_array_insert_middle_2k(c: &mut Criterion) {
    c.bench_function("array::insert_middle_2k", |b| {
        b.iter_batched(
            || (0..1_000u64).collect::<DynamicArray<u64>>(),
            |mut a| {
                for i in 0..2_000u64 {
                    let mid = a.begin().offset(&a, (a.len() / 2) as isize).unwrap();
                    a.insert(mid, i).unwrap();
                }
                black_box(a)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_array_cursor_walk_100k(c: &mut Criterion) {
    let a: DynamicArray<u64> = (0..100_000).collect();
    c.bench_function("array::cursor_walk_100k", |b| {
        b.iter(|| {
            let mut cur = a.cbegin();
            let mut sum = 0u64;
            while let Ok(v) = cur.get() {
                sum = sum.wrapping_add(*v);
                let _ = cur.move_next();
            }
            black_box(sum)
        })
    });
}

fn bench_sequence_push_both_ends_100k(c: &mut Criterion) {
    c.bench_function("sequence::push_both_ends_100k", |b| {
        b.iter_batched(
            LinkedSequence::<u64>::new,
            |mut s| {
                for i in 0..50_000u64 {
                    s.append(i);
                    s.prepend(i);
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_sequence_erase_every_other_10k(c: &mut Criterion) {
    c.bench_function("sequence::erase_every_other_10k", |b| {
        b.iter_batched(
            || (0..20_000u64).collect::<LinkedSequence<u64>>(),
            |mut s| {
                let mut cur = s.begin_mut();
                while cur.remove_current().is_ok() {
                    if cur.move_next().is_err() {
                        break;
                    }
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_sequence_iter_100k(c: &mut Criterion) {
    let s: LinkedSequence<u64> = (0..100_000).collect();
    c.bench_function("sequence::iter_100k", |b| {
        b.iter(|| black_box(s.iter().sum::<u64>()))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_array;
    config = bench_config();
    targets = bench_array_append_100k,
              bench_array_insert_middle_2k,
              bench_array_cursor_walk_100k
}
criterion_group! {
    name = benches_sequence;
    config = bench_config();
    targets = bench_sequence_push_both_ends_100k,
              bench_sequence_erase_every_other_10k,
              bench_sequence_iter_100k
}
criterion_main!(benches_array, benches_sequence);
