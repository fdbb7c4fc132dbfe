use bytetable::{KeyMode, Table};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> Vec<u8> {
    format!("k{:016x}", n).into_bytes()
}

fn filled(seed: u64, n: usize) -> (Table<u64>, Vec<Vec<u8>>) {
    let mut t = Table::new();
    let keys: Vec<_> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.put(k, i as u64).unwrap();
    }
    (t, keys)
}

fn bench_put_fresh(c: &mut Criterion) {
    c.bench_function("table::put_fresh_100k", |b| {
        let keys: Vec<_> = lcg(1).take(100_000).map(key).collect();
        b.iter_batched(
            Table::<u64>::new,
            |mut t| {
                for (i, k) in keys.iter().enumerate() {
                    t.put(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

// Pre-sized buckets: no automatic resize on the way.
fn bench_put_presized(c: &mut Criterion) {
    c.bench_function("table::put_presized_100k", |b| {
        let keys: Vec<_> = lcg(2).take(100_000).map(key).collect();
        b.iter_batched(
            || Table::<u64>::with_buckets(1 << 18),
            |mut t| {
                for (i, k) in keys.iter().enumerate() {
                    t.put(k, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("table::get_hit_10k_on_100k", |b| {
        let (t, keys) = filled(7, 100_000);
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<&[u8]> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].as_slice()
            })
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("table::get_miss_10k_on_100k", |b| {
        let (t, _) = filled(11, 100_000);
        let misses: Vec<_> = lcg(0xdead_beef).take(10_000).map(key).collect();
        b.iter(|| {
            for k in &misses {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_remove_reinsert(c: &mut Criterion) {
    c.bench_function("table::remove_reinsert_10k_of_100k", |b| {
        b.iter_batched(
            || filled(5, 100_000),
            |(mut t, keys)| {
                for k in keys.iter().take(10_000) {
                    let v = t.remove(k).unwrap();
                    t.put(k, v).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_resize(c: &mut Criterion) {
    c.bench_function("table::resize_double_100k", |b| {
        b.iter_batched(
            || filled(13, 100_000).0,
            |mut t| {
                black_box(t.resize(0));
                t
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_keys(c: &mut Criterion) {
    let (t, _) = filled(17, 100_000);
    c.bench_function("table::keys_borrowed_100k", |b| {
        b.iter(|| black_box(t.keys(KeyMode::Borrowed).unwrap().len()))
    });
    c.bench_function("table::keys_copied_100k", |b| {
        b.iter(|| black_box(t.keys(KeyMode::Copied).unwrap().len()))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_put_fresh, bench_put_presized, bench_get_hit, bench_get_miss,
        bench_remove_reinsert, bench_resize, bench_keys
}
criterion_main!(benches);
