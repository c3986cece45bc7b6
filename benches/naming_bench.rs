//! Criterion benchmarks for placeholder resolution.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use daq_results::{
    naming::resolve_placeholders, parameter::Parameter, registry::ParameterRegistry,
};

fn bench_registry() -> ParameterRegistry {
    let mut registry = ParameterRegistry::new();
    for i in 0..16 {
        registry
            .register(
                Parameter::float(format!("param_{i}"), format!("Parameter {i}"))
                    .with_default(f64::from(i) * 1.25),
            )
            .expect("Failed to register parameter");
    }
    registry
}

fn bench_resolve(c: &mut Criterion) {
    let registry = bench_registry();

    c.bench_function("resolve_plain_text", |b| {
        b.iter(|| resolve_placeholders(black_box("no tokens at all"), &registry))
    });

    c.bench_function("resolve_three_tokens", |b| {
        b.iter(|| {
            resolve_placeholders(
                black_box("{Parameter 1}_{Parameter 2:.3f}_{Parameter 3}"),
                &registry,
            )
        })
    });

    c.bench_function("resolve_repeated_token", |b| {
        b.iter(|| {
            resolve_placeholders(
                black_box("{Parameter 4}/{Parameter 4}/{Parameter 4}"),
                &registry,
            )
        })
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
