use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use balanced_map::BalancedMap;

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let keys: Vec<String> = (0..N).map(|_| format!("{:010}", rng.gen::<u32>())).collect();

    c.bench_function("map_insert", |b| {
        let mut map = BalancedMap::new();
        b.iter(|| {
            for (i, key) in keys.iter().enumerate() {
                map.insert(key.clone(), i as u64);
            }
        })
    });

    let mut map = BalancedMap::new();
    for (i, key) in keys.iter().enumerate() {
        map.insert(key.clone(), i as u64);
    }

    c.bench_function("map_get", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(map.get(key));
            }
        })
    });

    c.bench_function("map_iter", |b| {
        b.iter(|| {
            for (k, v) in &map {
                black_box((k, v));
            }
        })
    });

    c.bench_function("map_range", |b| {
        b.iter(|| {
            black_box(map.range("2", "7"));
        })
    });

    c.bench_function("map_remove", |b| {
        let mut map = map.clone();
        b.iter(|| {
            for key in &keys {
                map.remove(key);
            }
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
