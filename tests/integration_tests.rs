//! Integration tests for the analysis and clustering engine

use soundprint::{
    analyze_audio, analyze_file, cluster, cluster_with_config, load, AnalysisConfig,
    AnalysisError, AnalysisRecord, ClusterConfig, FeatureSet, Key, RhythmComplexity,
};
use std::f32::consts::PI;
use std::path::PathBuf;

fn sine(freq: f32, seconds: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Decaying noise bursts, one per beat
fn click_track(bpm: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    let mut samples = vec![0.0f32; n];
    let period = (60.0 * sample_rate as f32 / bpm) as usize;
    let mut state: u32 = 12345;
    for start in (0..n).step_by(period) {
        for i in 0..300.min(n - start) {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let noise = (state >> 16) as f32 / 32768.0 - 1.0;
            samples[start + i] = 0.8 * noise * (-(i as f32) / 60.0).exp();
        }
    }
    samples
}

/// Write mono samples as a 16-bit WAV file, duplicated across `channels`
fn write_wav(name: &str, samples: &[f32], sample_rate: u32, channels: u16) -> PathBuf {
    let path = std::env::temp_dir().join(format!("soundprint_{}_{}.wav", std::process::id(), name));
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create WAV");
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(v).expect("Failed to write sample");
        }
    }
    writer.finalize().expect("Failed to finalize WAV");
    path
}

#[test]
fn test_pure_tone_is_harmonic_and_centred() {
    let samples = sine(440.0, 2.0, 22050, 0.5);
    let record = analyze_audio(&samples, 22050, &AnalysisConfig::default())
        .expect("Analysis should succeed");

    assert!(
        record.harmonic_ratio() >= 0.95,
        "harmonic ratio {:.3}",
        record.harmonic_ratio()
    );
    let centroid = record.spectral().centroid_mean;
    assert!((centroid - 440.0).abs() <= 50.0, "centroid {:.1} Hz", centroid);
    assert!((record.duration() - 2.0).abs() < 1e-3);
    assert_eq!(record.basic_info().duration_formatted, "0:02");
    assert!(record.tempo() > 0.0);
}

#[test]
fn test_single_window_of_silence() {
    let config = AnalysisConfig::default();
    let samples = vec![0.0f32; config.frame_size];
    let record = analyze_audio(&samples, 22050, &config).expect("Silence must not fail");

    assert_eq!(record.rhythm().onset_strength_mean, 0.0);
    assert_eq!(record.spectral().centroid_mean, 0.0);
    assert_eq!(record.harmonic_ratio(), 0.0);
    assert_eq!(record.tempo(), config.start_bpm);
    assert_eq!(record.rhythm().complexity_label, RhythmComplexity::Simple);
    assert!(record.rhythm().beat_times.is_empty());
}

#[test]
fn test_too_short_input() {
    let result = analyze_audio(&[0.1; 1000], 22050, &AnalysisConfig::default());
    assert!(matches!(
        result,
        Err(AnalysisError::InsufficientSamples { samples: 1000, .. })
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = AnalysisConfig {
        hop_size: 0,
        ..AnalysisConfig::default()
    };
    let result = analyze_audio(&sine(440.0, 1.0, 22050, 0.5), 22050, &config);
    assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));

    let config = AnalysisConfig {
        beat_tightness: 0.0,
        ..AnalysisConfig::default()
    };
    assert!(config.validate().is_err());
    let result = analyze_audio(&sine(440.0, 1.0, 22050, 0.5), 22050, &config);
    assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
}

#[test]
fn test_resampled_input_matches_duration() {
    let samples = sine(440.0, 2.0, 44100, 0.5);
    let record = analyze_audio(&samples, 44100, &AnalysisConfig::default())
        .expect("Analysis should succeed");
    assert!((record.duration() - 2.0).abs() < 1e-3);
    let centroid = record.spectral().centroid_mean;
    assert!((centroid - 440.0).abs() <= 50.0, "centroid {:.1} Hz", centroid);
}

#[test]
fn test_click_track_tempo_and_beats() {
    let samples = click_track(120.0, 10.0, 22050);
    let record = analyze_audio(&samples, 22050, &AnalysisConfig::default())
        .expect("Analysis should succeed");

    assert!((record.tempo() - 120.0).abs() < 6.0, "tempo {:.2}", record.tempo());
    let beats = &record.rhythm().beat_times;
    assert!(beats.len() >= 12, "{} beats", beats.len());
    assert!(beats.windows(2).all(|w| w[1] > w[0]));
    assert!(record.harmonic_ratio() < 0.5);
}

/// I-IV-V-I in C major (C5 register), one second per chord
fn c_major_cadence(sample_rate: u32) -> Vec<f32> {
    let chords: [[f32; 3]; 4] = [
        [523.25, 659.26, 783.99], // C E G
        [698.46, 880.00, 1046.50], // F A C
        [783.99, 987.77, 1174.66], // G B D
        [523.25, 659.26, 783.99], // C E G
    ];
    chords
        .iter()
        .flat_map(|chord| {
            let notes: Vec<Vec<f32>> = chord
                .iter()
                .map(|&f| sine(f, 1.0, sample_rate, 0.25))
                .collect();
            (0..notes[0].len()).map(move |i| notes.iter().map(|n| n[i]).sum::<f32>())
        })
        .collect()
}

#[test]
fn test_cadence_is_c_major() {
    let record = analyze_audio(&c_major_cadence(22050), 22050, &AnalysisConfig::default())
        .expect("Analysis should succeed");
    assert_eq!(record.key(), Key::Major(0), "{}", record.basic_info().key_name);
    assert_eq!(record.basic_info().key_name, "C major");
}

#[test]
fn test_key_is_scale_invariant() {
    let cadence = c_major_cadence(22050);
    let config = AnalysisConfig::default();
    let reference = analyze_audio(&cadence, 22050, &config).unwrap();

    for scale in [0.1f32, 1e-5, 1e-9] {
        let scaled: Vec<f32> = cadence.iter().map(|s| s * scale).collect();
        let record = analyze_audio(&scaled, 22050, &config).unwrap();
        assert_eq!(record.key(), reference.key(), "scale {:e}", scale);
    }
}

#[test]
fn test_wav_roundtrip_through_loader() {
    let samples = sine(440.0, 1.5, 44100, 0.5);
    let path = write_wav("stereo_sine", &samples, 44100, 2);

    let config = AnalysisConfig::default();
    let buffer = load(&path, &config).expect("WAV should decode");
    assert_eq!(buffer.sample_rate(), 22050);
    assert!((buffer.duration_seconds() - 1.5).abs() < 0.01);

    let record = analyze_file(&path, &config).expect("Analysis should succeed");
    assert!(record.harmonic_ratio() >= 0.9);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_file_is_decode_error() {
    let result = analyze_file("/nonexistent/soundprint.wav", &AnalysisConfig::default());
    assert!(matches!(result, Err(AnalysisError::DecodeError(_))));
}

#[test]
fn test_record_json_roundtrip() {
    let record = analyze_audio(&sine(330.0, 1.0, 22050, 0.4), 22050, &AnalysisConfig::default())
        .unwrap();
    let json = serde_json::to_string_pretty(&record).unwrap();
    let back: AnalysisRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.basic_info().key_name, record.basic_info().key_name);
    assert_eq!(back.timbre().mfcc_mean.len(), 13);
}

#[test]
fn test_cluster_tones_and_clicks() {
    let config = AnalysisConfig::default();
    let records: Vec<AnalysisRecord> = [
        sine(440.0, 2.0, 22050, 0.5),
        sine(523.25, 2.0, 22050, 0.5),
        click_track(120.0, 4.0, 22050),
        click_track(125.0, 4.0, 22050),
    ]
    .iter()
    .map(|s| analyze_audio(s, 22050, &config).unwrap())
    .collect();

    // Raw columns: the centroid gap between tones and noise bursts dominates
    let config = ClusterConfig {
        k: 2,
        feature_set: FeatureSet::Extended,
        standardize: false,
        ..ClusterConfig::default()
    };
    let result = cluster_with_config(&records, &config).unwrap();

    assert_eq!(result.assignments.len(), 4);
    assert_eq!(result.assignments[0], result.assignments[1]);
    assert_eq!(result.assignments[2], result.assignments[3]);
    assert_ne!(result.assignments[0], result.assignments[2]);
    assert_eq!(result.summaries.iter().map(|s| s.size).sum::<usize>(), 4);

    let again = cluster_with_config(&records, &config).unwrap();
    assert_eq!(result, again);
}

#[test]
fn test_cluster_count_errors() {
    let record = analyze_audio(&sine(440.0, 1.0, 22050, 0.5), 22050, &AnalysisConfig::default())
        .unwrap();
    assert!(matches!(
        cluster(&[record.clone()], 2),
        Err(AnalysisError::InvalidClusterCount { k: 2, records: 1 })
    ));
    assert!(matches!(
        cluster(&[record], 0),
        Err(AnalysisError::InvalidClusterCount { k: 0, .. })
    ));
    assert!(matches!(cluster(&[], 1), Err(AnalysisError::EmptyInput(_))));
}
