use std::io::Cursor;

use burrow_common::StoreOptions;
use burrow_store::Store;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::tempdir;

const N_KEYS: u64 = 4_096;
const VALUE_SIZE: usize = 100;

fn filled_store() -> (tempfile::TempDir, Store) {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path().join("bench.burrow"), StoreOptions::default()).unwrap();
    for i in 0..N_KEYS {
        store
            .add(&format!("key{i}"), &mut Cursor::new(vec![b'x'; VALUE_SIZE]))
            .unwrap();
    }
    (dir, store)
}

fn add_benchmark(c: &mut Criterion) {
    c.bench_function("add_4k_keys", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let store =
                    Store::open(dir.path().join("bench.burrow"), StoreOptions::default()).unwrap();
                (dir, store)
            },
            |(_dir, store)| {
                for i in 0..N_KEYS {
                    store
                        .add(&format!("key{i}"), &mut Cursor::new(vec![b'x'; VALUE_SIZE]))
                        .unwrap();
                }
            },
            BatchSize::LargeInput,
        );
    });
}

fn get_hit_benchmark(c: &mut Criterion) {
    c.bench_function("get_hit_4k", |b| {
        b.iter_batched(
            filled_store,
            |(_dir, store)| {
                for i in 0..N_KEYS {
                    let bytes = store.get(&format!("key{i}")).unwrap().read_all().unwrap();
                    assert_eq!(bytes.len(), VALUE_SIZE);
                }
            },
            BatchSize::LargeInput,
        );
    });
}

fn get_miss_benchmark(c: &mut Criterion) {
    c.bench_function("get_miss_4k", |b| {
        b.iter_batched(
            filled_store,
            |(_dir, store)| {
                for i in 0..N_KEYS {
                    assert!(store.get(&format!("missing{i}")).is_err());
                }
            },
            BatchSize::LargeInput,
        );
    });
}

fn walk_benchmark(c: &mut Criterion) {
    c.bench_function("walk_4k", |b| {
        b.iter_batched(
            filled_store,
            |(_dir, store)| {
                let mut seen = 0u64;
                store
                    .walk(
                        |_| true,
                        |_, data| {
                            seen += data.len();
                            Ok(())
                        },
                    )
                    .unwrap();
                assert_eq!(seen, N_KEYS * VALUE_SIZE as u64);
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    add_benchmark,
    get_hit_benchmark,
    get_miss_benchmark,
    walk_benchmark
);
criterion_main!(benches);
