//! Scan throughput benchmark
//!
//! Compares the compiled automaton against one substring search per
//! signature, over benign and hostile payloads of growing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use netguard::security::{linear_scan, MatchEngine, BUILTIN_REGISTRY};

const BENIGN: &str = "GET /api/v1/orders?page=2&sort=desc HTTP/1.1 Host: shop.example.com \
                      User-Agent: Mozilla/5.0 Accept: application/json ";

const HOSTILE: &str = "id=1' OR 1=1 -- <script>alert(document.cookie)</script> \
                       ../etc/passwd; rm -rf / <!DOCTYPE x [<!ENTITY y SYSTEM \"file:///\">]> ";

fn payload(unit: &str, bytes: usize) -> String {
    unit.repeat(bytes / unit.len() + 1)
}

fn bench_scan(c: &mut Criterion) {
    let engine = MatchEngine::builtin().expect("builtin signatures compile");
    let mut group = c.benchmark_group("scan");

    for (name, unit) in [("benign", BENIGN), ("hostile", HOSTILE)] {
        for size in [256usize, 4 * 1024, 64 * 1024] {
            let input = payload(unit, size);
            group.throughput(Throughput::Bytes(input.len() as u64));

            group.bench_with_input(
                BenchmarkId::new(format!("automaton/{name}"), size),
                &input,
                |b, input| b.iter(|| engine.scan(black_box(input))),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("linear/{name}"), size),
                &input,
                |b, input| b.iter(|| linear_scan(black_box(input), &BUILTIN_REGISTRY)),
            );
        }
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_builtin", |b| {
        b.iter(|| MatchEngine::builtin().expect("builtin signatures compile"))
    });
}

criterion_group!(benches, bench_scan, bench_compile);
criterion_main!(benches);
