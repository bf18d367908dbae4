//! Side-input iteration benchmarks
//!
//! ## Benchmark Groups
//!
//! - `iter_pass/*`: one full pass over a stream through a pooled slot
//! - `reiter_spawn/*`: cost of starting a fresh pass from a re-iterable factory
//! - `multimap_lookup/*`: per-key lookup through the state-backed adapter
//!
//! | Benchmark | What it exercises | Regression detection |
//! |-----------|-------------------|----------------------|
//! | iter_pass/* | init, N reads with conversion, reset | per-record mapping cost |
//! | reiter_spawn/* | registry lookup, iterator build, cursor open | construction overhead |
//! | multimap_lookup/* | key conversion, adapter, state read | state lock and scan cost |
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench sideinput_iteration
//! cargo bench --bench sideinput_iteration -- "iter_pass"
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sideinput::{
    EngineConfig, InputRegistry, IterSignature, KeyedSource, MemoryStateStore, MemoryStream,
    ProcessContext, ReusableInput, SideInputEngine, SideInputError, SideInputSource, SideInputType,
    StateBackedAdapter, ValueType, Window,
};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Setup helpers - all allocation happens here, outside timed loops
// =============================================================================

fn engine() -> SideInputEngine {
    SideInputEngine::new(Arc::new(InputRegistry::new()), EngineConfig::default())
}

fn int_stream(n: usize) -> Arc<MemoryStream> {
    Arc::new(MemoryStream::from_values((0..n as i64).collect::<Vec<_>>()))
}

// =============================================================================
// Iteration
// =============================================================================

fn iter_pass_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("iter_pass");
    let engine = engine();

    for size in [10usize, 1_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));
        let ty = SideInputType::Iter(IterSignature::values(ValueType::Float).timestamped());
        let mut slot = engine
            .slot(&ty, SideInputSource::Stream(int_stream(size)))
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let rows = slot
                    .invoke(|v| -> Result<usize, SideInputError> {
                        let mut count = 0;
                        for row in v.into_iter_fn()? {
                            black_box(row?);
                            count += 1;
                        }
                        Ok(count)
                    })
                    .unwrap();
                black_box(rows)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Re-iterable factory
// =============================================================================

fn reiter_spawn_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("reiter_spawn");
    group.throughput(Throughput::Elements(1));
    let engine = engine();
    let ty = SideInputType::ReIter(IterSignature::values(ValueType::Int));
    let mut input = engine.make_reiter(&ty, int_stream(16)).unwrap();
    input.init().unwrap();

    group.bench_function("spawn_and_close", |b| {
        b.iter(|| {
            let f = input.fetch().unwrap().into_reiter_fn().unwrap();
            f.call().unwrap().close().unwrap();
        });
    });

    group.finish();
}

// =============================================================================
// Keyed multimap
// =============================================================================

fn multimap_lookup_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("multimap_lookup");
    group.throughput(Throughput::Elements(1));

    const NUM_KEYS: i64 = 1_000;
    let store = Arc::new(MemoryStateStore::new());
    for k in 0..NUM_KEYS {
        store.extend("side0", Window::Global, k, [k, k + 1]);
    }
    let ty = SideInputType::MultiMap {
        key: ValueType::Int,
        iter: IterSignature::values(ValueType::Int),
    };
    let mut input = engine()
        .make_multimap(
            &ty,
            KeyedSource {
                ctx: ProcessContext::new("bench", "t0"),
                adapter: Arc::new(StateBackedAdapter::new("side0")),
                reader: store,
                window: Window::Global,
            },
        )
        .unwrap();

    group.bench_function("hit", |b| {
        let mut key = 0;
        b.iter(|| {
            key = (key + 1) % NUM_KEYS;
            let f = input.fetch().unwrap().into_multimap_fn().unwrap();
            black_box(f.call(key).unwrap().drain().unwrap())
        });
    });

    group.bench_function("miss", |b| {
        b.iter(|| {
            let f = input.fetch().unwrap().into_multimap_fn().unwrap();
            black_box(f.call(-1).unwrap().drain().unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    name = iteration;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = iter_pass_benchmarks, reiter_spawn_benchmarks, multimap_lookup_benchmarks
);

criterion_main!(iteration);
