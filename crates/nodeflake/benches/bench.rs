use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use nodeflake::{
    AtomicSnowflakeGenerator, EPOCH, LockSnowflakeGenerator, MonotonicClock, NodeId,
    SnowflakeGenerator, TimeSource, UserIdGenerator, format_id, parse_timestamp,
};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    thread::scope,
    time::Instant,
};

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// Advances one millisecond every `TOTAL_IDS` reads so the hot path never
/// waits.
struct SteppingTime {
    reads: AtomicU64,
}

impl SteppingTime {
    const fn new() -> Self {
        Self {
            reads: AtomicU64::new(0),
        }
    }
}

impl TimeSource for SteppingTime {
    fn current_millis(&self) -> u64 {
        EPOCH + 1 + self.reads.fetch_add(1, Ordering::Relaxed) / TOTAL_IDS as u64
    }
}

fn node() -> NodeId {
    NodeId::new(3, 5).unwrap()
}

fn bench_generator<G>(c: &mut Criterion, group_name: &str, factory: impl Fn() -> G)
where
    G: SnowflakeGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let generator = factory();
            let start = Instant::now();
            for _ in 0..iters {
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().unwrap());
                }
            }
            start.elapsed()
        });
    });
    group.finish();
}

fn bench_generator_threaded<G>(
    c: &mut Criterion,
    group_name: &str,
    threads: usize,
    factory: impl Fn() -> G,
) where
    G: SnowflakeGenerator + Sync,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));

    group.bench_function(format!("threads/{threads}/elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let generator = factory();
            let start = Instant::now();
            scope(|s| {
                for _ in 0..threads {
                    s.spawn(|| {
                        for _ in 0..iters {
                            for _ in 0..TOTAL_IDS {
                                black_box(generator.next_id().unwrap());
                            }
                        }
                    });
                }
            });
            start.elapsed()
        });
    });
    group.finish();
}

fn bench_mock(c: &mut Criterion) {
    bench_generator(c, "mock/lock", || {
        LockSnowflakeGenerator::new(node(), SteppingTime::new())
    });
    bench_generator(c, "mock/atomic", || {
        AtomicSnowflakeGenerator::new(node(), SteppingTime::new())
    });
}

fn bench_monotonic(c: &mut Criterion) {
    let clock = MonotonicClock::new();
    bench_generator(c, "mono/lock", || {
        LockSnowflakeGenerator::new(node(), clock.clone())
    });
    bench_generator(c, "mono/atomic", || {
        AtomicSnowflakeGenerator::new(node(), clock.clone())
    });

    for threads in [2, 4, 8] {
        bench_generator_threaded(c, "mono/lock", threads, || {
            LockSnowflakeGenerator::new(node(), clock.clone())
        });
        bench_generator_threaded(c, "mono/atomic", threads, || {
            AtomicSnowflakeGenerator::new(node(), clock.clone())
        });
    }
}

fn bench_api(c: &mut Criterion) {
    let generator = UserIdGenerator::new(Some(3), Some(5)).unwrap();
    let mut group = c.benchmark_group("api");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("generate_user_ids/1000", |b| {
        b.iter(|| black_box(generator.generate_user_ids(1000).unwrap()));
    });
    group.finish();

    let id = generator.next_id().unwrap();
    c.bench_function("decode/parse_timestamp", |b| {
        b.iter(|| parse_timestamp(black_box(id)));
    });
    c.bench_function("decode/format_id", |b| b.iter(|| format_id(black_box(id))));
}

criterion_group!(benches, bench_mock, bench_monotonic, bench_api);
criterion_main!(benches);
