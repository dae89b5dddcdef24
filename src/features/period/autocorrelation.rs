//! Autocorrelation-based tempo estimation
//!
//! Finds periodicity in the onset strength envelope using FFT-accelerated
//! autocorrelation.
//!
//! # Algorithm
//!
//! 1. Compute autocorrelation using FFT acceleration: `ACF = IFFT(|FFT(env)|²)`
//! 2. Restrict lags to the BPM range: `lag = (60 * sample_rate) / (BPM * hop_size)`
//! 3. Sum each lag with its two neighbours, so a period that falls between
//!    two integer lags is not split in half
//! 4. Weight every lag by a log-normal prior centred at `start_bpm`
//! 5. Pick the strongest weighted peak and refine it to the ACF centroid of
//!    its neighbourhood
//! 6. Convert lag to BPM: `BPM = (60 * sample_rate) / (lag * hop_size)`
//!
//! An envelope without periodic energy (silence, a single onset) yields
//! `start_bpm` so the tempo stays strictly positive.
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.
//!
//! # Example
//!
//! ```no_run
//! use soundprint::features::period::autocorrelation::estimate_tempo;
//!
//! let onset_env = vec![0.0f32; 1000];
//! let tempo = estimate_tempo(&onset_env, 22050, 512, 30.0, 300.0, 120.0, 1.0)?;
//! assert_eq!(tempo.bpm, 120.0);
//! # Ok::<(), soundprint::AnalysisError>(())
//! ```

use super::TempoEstimate;
use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

const EPSILON: f32 = 1e-10;

/// Estimate the global tempo of an onset strength envelope
///
/// # Arguments
///
/// * `onset_env` - Onset strength, one value per STFT frame
/// * `sample_rate` - Sample rate in Hz
/// * `hop_size` - Hop size used for the envelope (samples per frame)
/// * `min_bpm` - Minimum BPM to consider (default: 30.0)
/// * `max_bpm` - Maximum BPM to consider (default: 300.0)
/// * `start_bpm` - Centre of the tempo prior (default: 120.0)
/// * `std_octaves` - Width of the tempo prior in octaves (default: 1.0)
///
/// # Returns
///
/// Tempo estimate; `bpm` is `start_bpm` when no periodicity is found
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate or hop size,
/// an empty or inverted BPM range, or a non-positive prior.
pub fn estimate_tempo(
    onset_env: &[f32],
    sample_rate: u32,
    hop_size: usize,
    min_bpm: f32,
    max_bpm: f32,
    start_bpm: f32,
    std_octaves: f32,
) -> Result<TempoEstimate, AnalysisError> {
    log::debug!(
        "Estimating tempo from autocorrelation: {} frames, {} Hz, hop={}, range=[{:.1}, {:.1}] BPM",
        onset_env.len(),
        sample_rate,
        hop_size,
        min_bpm,
        max_bpm
    );

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    if hop_size == 0 {
        return Err(AnalysisError::InvalidInput("Invalid hop size: 0".to_string()));
    }

    if min_bpm <= 0.0 || max_bpm <= 0.0 || min_bpm >= max_bpm {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid BPM range: [{:.1}, {:.1}]",
            min_bpm, max_bpm
        )));
    }

    if start_bpm <= 0.0 || std_octaves <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid tempo prior: start={:.1} BPM, std={:.2} octaves",
            start_bpm, std_octaves
        )));
    }

    let fallback = TempoEstimate {
        bpm: start_bpm,
        confidence: 0.0,
    };

    if onset_env.len() < 2 {
        log::warn!("Onset envelope too short for autocorrelation: {}", onset_env.len());
        return Ok(fallback);
    }

    let acf = compute_autocorrelation_fft(onset_env);
    let energy = acf[0];
    if energy < EPSILON {
        log::debug!("Onset envelope has no energy, using prior centre {:.1} BPM", start_bpm);
        return Ok(fallback);
    }

    let frames_per_minute = 60.0 * sample_rate as f32 / hop_size as f32;
    let lag_min = ((frames_per_minute / max_bpm).ceil() as usize).max(1);
    let lag_max = ((frames_per_minute / min_bpm).floor() as usize).min(acf.len() - 1);

    if lag_min > lag_max {
        log::warn!(
            "Invalid lag range: [{}, {}] for ACF length {}",
            lag_min,
            lag_max,
            acf.len()
        );
        return Ok(fallback);
    }

    let weighted: Vec<f32> = (lag_min..=lag_max)
        .map(|lag| {
            let bpm = frames_per_minute / lag as f32;
            neighbourhood_sum(&acf, lag) * tempo_prior(bpm, start_bpm, std_octaves)
        })
        .collect();

    let Some((best_lag, best_value)) = find_best_peak(&weighted, lag_min) else {
        log::debug!("No periodicity in onset envelope, using prior centre {:.1} BPM", start_bpm);
        return Ok(fallback);
    };

    let lag = refine_lag(&acf, best_lag);
    let bpm = (frames_per_minute / lag).clamp(min_bpm, max_bpm);
    let confidence = (acf[best_lag] / energy).clamp(0.0, 1.0);

    log::debug!(
        "Tempo estimate: {:.2} BPM (lag {:.2}, weighted ACF {:.4}, confidence {:.3})",
        bpm,
        lag,
        best_value,
        confidence
    );

    Ok(TempoEstimate { bpm, confidence })
}

/// Log-normal tempo prior: `exp(-0.5 * ((log2(bpm) - log2(start)) / std)²)`
fn tempo_prior(bpm: f32, start_bpm: f32, std_octaves: f32) -> f32 {
    let z = (bpm.log2() - start_bpm.log2()) / std_octaves;
    (-0.5 * z * z).exp()
}

/// Compute autocorrelation using FFT acceleration
///
/// Uses the identity: ACF = IFFT(|FFT(signal)|²)
///
/// # Returns
///
/// Non-negative autocorrelation function (same length as input)
fn compute_autocorrelation_fft(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();

    // Zero-pad to avoid circular wrap-around
    let fft_size = (2 * n).next_power_of_two();

    let mut fft_input: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft_input.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut fft_input);

    for x in &mut fft_input {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut fft_input);

    let scale = 1.0 / (fft_size as f32);
    fft_input[..n]
        .iter()
        .map(|x| (x.re * scale).max(0.0))
        .collect()
}

/// Strongest local maximum of the weighted ACF
///
/// Falls back to the global maximum when the slice has no interior peak
/// (monotone ACF). Returns `None` when every value is (near) zero.
fn find_best_peak(weighted: &[f32], offset: usize) -> Option<(usize, f32)> {
    let max_value = weighted.iter().copied().fold(0.0f32, f32::max);
    if max_value < EPSILON {
        return None;
    }

    let mut best: Option<(usize, f32)> = None;
    for i in 1..weighted.len().saturating_sub(1) {
        let value = weighted[i];
        if value > weighted[i - 1] && value >= weighted[i + 1] {
            match best {
                Some((_, v)) if v >= value => {}
                _ => best = Some((i + offset, value)),
            }
        }
    }

    best.or_else(|| {
        weighted
            .iter()
            .enumerate()
            .fold(None, |acc: Option<(usize, f32)>, (i, &v)| match acc {
                Some((_, best_v)) if best_v >= v => acc,
                _ => Some((i + offset, v)),
            })
    })
}

/// ACF summed over `lag - 1 ..= lag + 1`
fn neighbourhood_sum(acf: &[f32], lag: usize) -> f32 {
    let lo = lag.saturating_sub(1);
    let hi = (lag + 1).min(acf.len() - 1);
    acf[lo..=hi].iter().sum()
}

/// ACF-weighted centroid of the lags around `lag`
fn refine_lag(acf: &[f32], lag: usize) -> f32 {
    let lo = lag.saturating_sub(1).max(1);
    let hi = (lag + 1).min(acf.len() - 1);
    let (weighted, total) = (lo..=hi).fold((0.0f32, 0.0f32), |(w, t), l| {
        (w + l as f32 * acf[l], t + acf[l])
    });
    if total < EPSILON {
        return lag as f32;
    }
    weighted / total
}
