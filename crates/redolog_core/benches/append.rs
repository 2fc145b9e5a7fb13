//! Benchmarks for append and replay throughput.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use redolog_core::{CancelToken, Lsn, Policy, Wal};
use redolog_storage::MemStore;

fn append_benchmarks(c: &mut Criterion) {
    let value = vec![0xABu8; 512];

    let mut group = c.benchmark_group("append");
    group.throughput(Throughput::Bytes(512));
    group.bench_function("append_512b_value", |b| {
        b.iter_batched(
            || {
                Wal::with_store(
                    Box::new(MemStore::new()),
                    Policy::default(),
                    CancelToken::new(),
                )
                .unwrap()
            },
            |wal| {
                for i in 1..=100u64 {
                    wal.append(Lsn::new(i), i as i64, b"bench-key", &value)
                        .unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn replay_benchmarks(c: &mut Criterion) {
    let wal = Wal::with_store(
        Box::new(MemStore::new()),
        Policy::default(),
        CancelToken::new(),
    )
    .unwrap();
    let value = vec![0xCDu8; 512];
    for i in 1..=1000u64 {
        wal.append(Lsn::new(i), i as i64, b"bench-key", &value)
            .unwrap();
    }

    c.bench_function("replay_1000_records", |b| {
        b.iter(|| {
            let mut count = 0u64;
            wal.replay(Lsn::new(0), |_, _, _, _| {
                count += 1;
                Ok(())
            })
            .unwrap();
            assert_eq!(count, 1000);
        });
    });
}

criterion_group!(benches, append_benchmarks, replay_benchmarks);
criterion_main!(benches);
