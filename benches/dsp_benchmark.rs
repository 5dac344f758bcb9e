use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use minirds::dsp::{BiphaseShaper, Mixer, Oscillator, Resampler};

// Performance targets (must complete within these times, matching the
// generator's 20ms-per-chunk realtime budget at the default 4560-frame
// chunk size).
const TARGET_CHUNK_MIXDOWN_MS: f64 = 20.0;

fn benchmark_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("oscillator");

    group.bench_function("next_sin_cos_19khz", |b| {
        let mut osc = Oscillator::new(19_000.0, 228_000);
        b.iter(|| black_box(osc.next_sin_cos()))
    });

    group.bench_function("next_sin_cos_4560_samples", |b| {
        let mut osc = Oscillator::new(57_000.0, 228_000);
        b.iter(|| {
            for _ in 0..4_560 {
                black_box(osc.next_sin_cos());
            }
        })
    });

    group.finish();
}

fn benchmark_biphase_shaper(c: &mut Criterion) {
    let mut group = c.benchmark_group("biphase_shaper");

    group.bench_function("next_sample_single", |b| {
        let mut shaper = BiphaseShaper::new();
        let mut bit = 0u8;
        b.iter(|| {
            black_box(shaper.next_sample(|| {
                bit ^= 1;
                bit
            }))
        })
    });

    group.bench_function("next_sample_4560", |b| {
        b.iter(|| {
            let mut shaper = BiphaseShaper::new();
            let mut bit = 0u8;
            for _ in 0..4_560 {
                black_box(shaper.next_sample(|| {
                    bit ^= 1;
                    bit
                }));
            }
        })
    });

    group.finish();
}

fn benchmark_mixer(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixer");

    group.bench_function("mix_sample_no_rds2", |b| {
        let mut mixer = Mixer::new(228_000);
        b.iter(|| black_box(mixer.mix_sample(black_box(0.1), black_box(0.05), black_box(0.3), None)))
    });

    group.finish();
}

fn benchmark_resampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("resampler");
    group.throughput(criterion::Throughput::Elements(4_560));

    let chunk: Vec<f32> = (0..4_560)
        .map(|i| (i as f32 * 0.001).sin())
        .collect();

    group.bench_function("process_228k_to_192k", |b| {
        let mut resampler = Resampler::new(228_000, 192_000);
        b.iter(|| black_box(resampler.process(black_box(&chunk))))
    });

    group.bench_function("process_228k_to_48k", |b| {
        let mut resampler = Resampler::new(228_000, 48_000);
        b.iter(|| black_box(resampler.process(black_box(&chunk))))
    });

    group.finish();
}

// Regression check: a full 20ms chunk's worth of oscillator + biphase +
// mixer work, the hot path inside `GeneratorLoop::next_mpx_sample`, must
// stay comfortably inside the realtime budget.
fn check_performance_targets(c: &mut Criterion) {
    let mut group = c.benchmark_group("performance_targets");
    group.significance_level(0.05);

    group.bench_with_input(
        BenchmarkId::new("chunk_mixdown_under_20ms", "4560_frames"),
        &4_560usize,
        |b, &frames| {
            b.iter(|| {
                let mut mixer = Mixer::new(228_000);
                let mut shaper = BiphaseShaper::new();
                let mut bit = 0u8;
                for _ in 0..frames {
                    let sample = shaper.next_sample(|| {
                        bit ^= 1;
                        bit
                    });
                    black_box(mixer.mix_sample(0.0, 0.0, sample, None));
                }
            });
        },
    );

    group.finish();
    let _ = TARGET_CHUNK_MIXDOWN_MS;
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(100);
    targets = benchmark_oscillator,
              benchmark_biphase_shaper,
              benchmark_mixer,
              benchmark_resampler,
              check_performance_targets
}
criterion_main!(benches);
