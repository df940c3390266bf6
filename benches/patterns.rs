use chartscan::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Synthetic series with enough structure to keep every detector busy:
/// a slow swing, a faster ripple and a linear drift.
fn series(n: usize) -> SampleBuffer {
    let close: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + (t * 0.05).sin() * 12.0 + (t * 0.6).sin() * 1.5 + t * 0.02
        })
        .collect();
    let open: Vec<f64> = close.iter().map(|c| c - 0.4).collect();
    let high: Vec<f64> = close.iter().map(|c| c + 0.9).collect();
    let low: Vec<f64> = close.iter().map(|c| c - 0.9).collect();
    SampleBuffer::new(open, high, low, close, vec![1000.0; n]).unwrap()
}

fn request(n: usize) -> ScanRequest {
    let buf = series(n);
    ScanRequest {
        open: buf.opens().to_vec(),
        high: buf.highs().to_vec(),
        low: buf.lows().to_vec(),
        close: buf.closes().to_vec(),
        volume: vec![1000.0; n],
        ..Default::default()
    }
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    for n in [120usize, 500, 2000] {
        let buf = series(n);
        let swing_only = Scanner::new(DetectionContext::default());
        group.bench_with_input(BenchmarkId::new("swing", n), &buf, |b, buf| {
            b.iter(|| swing_only.scan(black_box(buf)))
        });
        let full = Scanner::new(DetectionContext::default()).include_candlesticks(true);
        group.bench_with_input(BenchmarkId::new("full", n), &buf, |b, buf| {
            b.iter(|| full.scan(black_box(buf)))
        });
    }
    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let symbols = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH"];
    c.bench_function("scan_parallel/8x500", |b| {
        let scanner = Scanner::new(DetectionContext::default()).include_candlesticks(true);
        b.iter(|| {
            let jobs: Vec<_> = symbols.iter().map(|s| (*s, request(500))).collect();
            scan_parallel(&scanner, black_box(jobs))
        })
    });
}

criterion_group!(benches, bench_scan, bench_parallel);
criterion_main!(benches);
