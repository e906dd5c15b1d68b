//! Argument normalization and error classification throughput.
//!
//! Both run on every tool call before or after the network round trip.
//! Measured with Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{Map, Value};
use toolbridge::dispatch::{classify, RawError};
use toolbridge::tools::{normalize_arguments, ArgumentMap, NameConventionDefaults};

const NAMES: [&str; 8] = [
    "maxCount", "isRecursive", "includeGlobs", "renderConfig", "path", "pageNumber", "userId", "label",
];

fn arguments(size: usize) -> ArgumentMap {
    let mut args = Map::new();
    for i in 0..size {
        let name = format!("{}{}", NAMES[i % NAMES.len()], i);
        let value = if i % 3 == 0 { Value::from(i) } else { Value::Null };
        args.insert(name, value);
    }
    args
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_arguments");
    for &size in &[0usize, 4, 16, 64, 256] {
        let args = arguments(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &args, |b, a| {
            b.iter(|| normalize_arguments(black_box(a), &NameConventionDefaults));
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let cases = [
        ("auth", RawError::new("HTTP 401 Unauthorized: token_expired", None)),
        ("not_found", RawError::new("HTTP 404 Not Found: /mcp", None)),
        ("protocol", RawError::new("path is required", Some(-32602))),
        ("fallback", RawError::new("connection reset by peer", None)),
    ];

    let mut group = c.benchmark_group("classify");
    for (label, raw) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(label), raw, |b, r| {
            b.iter(|| classify(black_box(r), 500));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_classify);
criterion_main!(benches);
