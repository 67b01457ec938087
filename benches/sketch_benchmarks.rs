//! Benchmarks for the adaptive density sketch
//!
//! Performance targets:
//! - `narrow_update`: O(counter_no) hashed writes, no rebinning
//! - `deep_update`: O(queue_size) replay plus a rebinning pass
//! - `count`/`pdf`: O(cmap_no) bin lookups, no hashing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use adaptive_sketch::{Identity, Sketch, SketchConf};

fn conf(cmap_size: usize, cmap_no: usize) -> SketchConf {
    SketchConf::builder(cmap_size, cmap_no)
        .cmap_bounds(0.0, 1000.0)
        .queue_size(4096)
        .start_threshold(4096)
        .build()
        .unwrap()
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("sketch_construction");

    for &cmap_size in &[64usize, 256, 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(cmap_size),
            &cmap_size,
            |b, &size| {
                b.iter(|| {
                    let sketch: Sketch<f64, Identity> = Sketch::empty(conf(size, 3), Identity);
                    black_box(sketch);
                });
            },
        );
    }

    group.finish();
}

fn bench_narrow_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("sketch_narrow_update");
    group.throughput(Throughput::Elements(1));

    for &(cmap_size, counter_no) in &[(256usize, 1usize), (256, 4), (1024, 4)] {
        let mut sketch: Sketch<f64, Identity> = Sketch::empty(
            SketchConf::builder(cmap_size, 3)
                .cmap_bounds(0.0, 1000.0)
                .counter_size(cmap_size / 4)
                .counter_no(counter_no)
                .queue_size(1_000_000)
                .start_threshold(1_000_000)
                .build()
                .unwrap(),
            Identity,
        );

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("size={cmap_size},d={counter_no}")),
            &cmap_size,
            |b, _| {
                let mut x = 0.0_f64;
                b.iter(|| {
                    sketch.narrow_update(&x);
                    x = (x + 1.0) % 1000.0;
                });
            },
        );
    }

    group.finish();
}

fn bench_deep_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("sketch_deep_update");

    for &queue_size in &[256usize, 1024, 4096] {
        group.bench_with_input(
            BenchmarkId::from_parameter(queue_size),
            &queue_size,
            |b, &size| {
                b.iter(|| {
                    let mut sketch: Sketch<f64, Identity> = Sketch::empty(
                        SketchConf::builder(256, 3)
                            .cmap_bounds(0.0, 1000.0)
                            .queue_size(size + 1)
                            .start_threshold(size + 1)
                            .build()
                            .unwrap(),
                        Identity,
                    );
                    let values: Vec<f64> = (0..size).map(|i| (i % 1000) as f64).collect();
                    sketch.update(&values);
                    sketch.deep_update();
                    black_box(&sketch);
                });
            },
        );
    }

    group.finish();
}

fn bench_count_and_pdf(c: &mut Criterion) {
    let mut group = c.benchmark_group("sketch_query");
    group.throughput(Throughput::Elements(1));

    let mut sketch: Sketch<f64, Identity> = Sketch::empty(conf(256, 3), Identity);
    let values: Vec<f64> = (0..4096).map(|i| (i % 1000) as f64).collect();
    sketch.update(&values);

    group.bench_function("count", |b| {
        b.iter(|| black_box(sketch.count(&100.0, &500.0)));
    });

    group.bench_function("pdf", |b| {
        b.iter(|| black_box(sketch.pdf(&250.0)));
    });

    group.bench_function("cdf", |b| {
        b.iter(|| black_box(sketch.cdf(&250.0)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_construction,
    bench_narrow_update,
    bench_deep_update,
    bench_count_and_pdf,
);
criterion_main!(benches);
