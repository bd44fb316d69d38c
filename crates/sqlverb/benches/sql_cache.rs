//! SQL cache lookups and shape hashing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sqlverb::sql::{DmlOperation, ShapeToken, SqlCache, SqlCacheKey, insert_sql};

fn columns(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("column_{i}")).collect()
}

fn bench_shape_token(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape_token");

    for count in [1, 8, 32] {
        let cols = columns(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &cols, |b, cols| {
            b.iter(|| black_box(ShapeToken::from_columns(cols.iter().map(String::as_str))));
        });
    }

    group.finish();
}

fn bench_cache_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_cache");
    let cols = columns(8);
    let names: Vec<&str> = cols.iter().map(String::as_str).collect();

    let mut cache = SqlCache::new();
    let key = SqlCacheKey::new(
        DmlOperation::Insert,
        "bench",
        ShapeToken::from_columns(names.iter().copied()),
    );
    cache.get_or_insert_with(key.clone(), || insert_sql("bench", &names));

    group.bench_function("hit", |b| {
        b.iter(|| {
            black_box(cache.get_or_insert_with(key.clone(), || insert_sql("bench", &names)))
        });
    });

    group.bench_function("token_and_hit", |b| {
        b.iter(|| {
            let key = SqlCacheKey::new(
                DmlOperation::Insert,
                "bench",
                ShapeToken::from_columns(names.iter().copied()),
            );
            black_box(cache.get_or_insert_with(key, || insert_sql("bench", &names)))
        });
    });

    group.bench_function("build_uncached", |b| {
        b.iter(|| black_box(insert_sql("bench", &names)));
    });

    group.finish();
}

criterion_group!(benches, bench_shape_token, bench_cache_lookup);
criterion_main!(benches);
