//! Symbol interning benchmarks.
//!
//! Run with: `cargo bench --bench symbol_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use portc_util::Interner;

fn bench_intern(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern");
    group.throughput(Throughput::Elements(1));

    group.bench_function("intern_new_string", |b| {
        let mut interner = Interner::new();
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            interner.intern(&format!("new_string_{}", counter))
        })
    });

    group.bench_function("intern_existing_string", |b| {
        let mut interner = Interner::new();
        let _ = interner.intern("existing_string");
        b.iter(|| black_box(interner.intern("existing_string")))
    });

    group.finish();
}

fn bench_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparison");
    group.throughput(Throughput::Elements(1));

    let mut interner = Interner::new();
    let sym1 = interner.intern("hello");
    let sym2 = interner.intern("hello");
    let sym3 = interner.intern("world");

    group.bench_function("symbol_eq_symbol", |b| {
        b.iter(|| {
            black_box(sym1 == sym2);
            black_box(sym1 == sym3);
        })
    });

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    group.throughput(Throughput::Elements(1));

    let mut interner = Interner::new();
    let sym = interner.intern("test_string");

    group.bench_function("resolve", |b| b.iter(|| black_box(interner.resolve(sym))));

    group.finish();
}

fn bench_varying_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("varying_sizes");

    let sizes = [1, 10, 100, 1000, 10000];

    for &size in &sizes {
        let string = "a".repeat(size);
        group.bench_with_input(BenchmarkId::new("intern", size), &string, |b, s| {
            b.iter(|| {
                let mut interner = Interner::new();
                black_box(interner.intern(s))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_intern, bench_comparison, bench_resolve, bench_varying_sizes);
criterion_main!(benches);
