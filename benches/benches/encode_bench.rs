use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use wv_core::{encode_waveform, CodecConfig};
use wv_types::{MarkerChannel, MarkerList, Markers};

/// Комплексная синусоида амплитудой 0.9.
fn tone(n: usize) -> (Vec<f32>, Vec<f32>) {
    (0..n)
        .map(|k| {
            let phi = 2.0 * std::f32::consts::PI * k as f32 / 64.0;
            (0.9 * phi.cos(), 0.9 * phi.sin())
        })
        .unzip()
}

fn bench_encode(c: &mut Criterion) {
    let created = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let markers = Markers::new().with(
        MarkerChannel::Marker1,
        MarkerList::from_rows(&[[0u64, 1], [32, 0]]).unwrap(),
    );

    let mut group = c.benchmark_group("encode");

    for n in [10_000usize, 1_000_000] {
        let (i, q) = tone(n);
        group.throughput(Throughput::Elements(n as u64));

        for (name, cfg) in [
            ("plain", CodecConfig::default()),
            (
                "checked",
                CodecConfig {
                    check_range: true,
                    ..CodecConfig::default()
                },
            ),
            (
                "normalized",
                CodecConfig {
                    normalize: true,
                    ..CodecConfig::default()
                },
            ),
        ] {
            group.bench_with_input(BenchmarkId::new(name, n), &n, |b, _| {
                b.iter(|| {
                    encode_waveform(
                        black_box(&i),
                        black_box(&q),
                        100e6,
                        Some(&markers),
                        &cfg,
                        created,
                    )
                    .unwrap()
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
