//! Performance benchmarks for analysis and clustering

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use soundprint::{analyze_audio, cluster, AnalysisConfig, AnalysisRecord};

fn synthetic(seconds: usize, sample_rate: u32, freq: f32) -> Vec<f32> {
    let beat = sample_rate as usize / 2;
    (0..sample_rate as usize * seconds)
        .map(|i| {
            let tone = (i as f32 * freq * 2.0 * std::f32::consts::PI / sample_rate as f32).sin();
            let click = if i % beat < 200 { 0.5 } else { 0.0 };
            tone * 0.4 + click
        })
        .collect()
}

fn bench_analyze_audio(c: &mut Criterion) {
    let config = AnalysisConfig::default();

    // 30 seconds at the analysis rate
    let samples = synthetic(30, 22050, 440.0);
    c.bench_function("analyze_audio_30s", |b| {
        b.iter(|| {
            let _ = analyze_audio(black_box(&samples), black_box(22050), black_box(&config));
        });
    });

    // Same length at 44.1 kHz, including resampling
    let samples = synthetic(30, 44100, 440.0);
    c.bench_function("analyze_audio_30s_resampled", |b| {
        b.iter(|| {
            let _ = analyze_audio(black_box(&samples), black_box(44100), black_box(&config));
        });
    });
}

fn bench_cluster(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let records: Vec<AnalysisRecord> = (0..16)
        .filter_map(|i| {
            let samples = synthetic(3, 22050, 220.0 + 40.0 * i as f32);
            analyze_audio(&samples, 22050, &config).ok()
        })
        .collect();

    c.bench_function("cluster_16_records_k4", |b| {
        b.iter(|| {
            let _ = cluster(black_box(&records), black_box(4));
        });
    });
}

criterion_group!(benches, bench_analyze_audio, bench_cluster);
criterion_main!(benches);
