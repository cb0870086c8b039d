//! Parser benchmarks. Run with `cargo bench --package portc-par`.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_parser_simple(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_simple");

    let source = "inteiro entrada() { retorne 42; }";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("single_procedure", |b| b.iter(|| portc_par::parse(black_box(source), "bench.por")));

    group.finish();
}

fn bench_parser_procedures(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_procedures");

    let source = r#"
        inteiro soma(inteiro a, inteiro b) {
            retorne a + b;
        }

        inteiro entrada() {
            inteiro i, total;
            total = 0;
            para (i = 0; i < 10; i = i + 1) {
                total = total + soma(i, 1);
            }
            retorne total;
        }
    "#;

    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("two_procedures", |b| b.iter(|| portc_par::parse(black_box(source), "bench.por")));

    group.finish();
}

fn bench_parser_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_expressions");

    let source = "inteiro entrada() { retorne 1 + 2 * 3 - 4 / 2 + (5 - 1) * 2 e 1 ou 0; }";
    group.bench_function("nested_arithmetic", |b| b.iter(|| portc_par::parse(black_box(source), "bench.por")));

    group.finish();
}

criterion_group!(benches, bench_parser_simple, bench_parser_procedures, bench_parser_expressions);
criterion_main!(benches);
