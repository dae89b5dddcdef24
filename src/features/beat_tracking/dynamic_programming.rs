//! Dynamic programming beat tracker
//!
//! Chooses the sequence of beat frames that maximizes onset strength at the
//! beats while keeping inter-beat intervals close to the global tempo period.
//!
//! # Algorithm
//!
//! 1. Normalize the onset envelope by its standard deviation
//! 2. Smooth it with a Gaussian window a little wider than one beat period
//! 3. For each frame, look back over `[period / 2, 2 * period]` frames for the
//!    best predecessor, penalizing deviation as `-tightness * ln(interval / period)²`
//! 4. Start from the last strong local maximum of the cumulative score and
//!    follow the back-links
//! 5. Drop weak beats at both ends (silence before the first and after the last onset)
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

use crate::error::AnalysisError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Track beats in an onset strength envelope
///
/// # Arguments
///
/// * `onset_env` - Onset strength, one value per STFT frame
/// * `bpm` - Global tempo estimate
/// * `sample_rate` - Sample rate in Hz
/// * `hop_size` - Hop size used for the envelope
/// * `tightness` - How strictly beats follow the tempo (default: 100.0)
///
/// # Returns
///
/// Beat times in seconds, ascending. Empty when the envelope has no onsets.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a non-positive tempo or
/// tightness, or a zero sample rate or hop size.
pub fn track_beats(
    onset_env: &[f32],
    bpm: f32,
    sample_rate: u32,
    hop_size: usize,
    tightness: f32,
) -> Result<Vec<f32>, AnalysisError> {
    if bpm <= 0.0 || !bpm.is_finite() {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid tempo for beat tracking: {}",
            bpm
        )));
    }
    if tightness <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid beat tightness: {}",
            tightness
        )));
    }
    if sample_rate == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate and hop size must be > 0".to_string(),
        ));
    }

    let frame_rate = sample_rate as f32 / hop_size as f32;
    let period = 60.0 * frame_rate / bpm;

    log::debug!(
        "Tracking beats: {} frames, {:.2} BPM (period {:.2} frames), tightness {:.1}",
        onset_env.len(),
        bpm,
        period,
        tightness
    );

    if onset_env.iter().all(|&v| v <= EPSILON) {
        log::debug!("Onset envelope is empty, no beats");
        return Ok(Vec::new());
    }

    let local = local_score(onset_env, period);
    let (cumulative, backlinks) = cumulative_score(&local, period, tightness);

    let Some(last) = last_beat(&cumulative) else {
        return Ok(Vec::new());
    };

    let mut beats = vec![last];
    let mut frame = last;
    while let Some(prev) = backlinks[frame] {
        beats.push(prev);
        frame = prev;
    }
    beats.reverse();

    let beats = trim_beats(&local, beats);

    log::debug!("Tracked {} beats", beats.len());

    Ok(beats
        .into_iter()
        .map(|f| f as f32 / frame_rate)
        .collect())
}

/// Onset envelope normalized by its standard deviation and smoothed with a
/// Gaussian window of `±period` frames
fn local_score(onset_env: &[f32], period: f32) -> Vec<f32> {
    let n = onset_env.len() as f32;
    let mean = onset_env.iter().sum::<f32>() / n;
    let std = (onset_env.iter().map(|&v| (v - mean).powi(2)).sum::<f32>() / n).sqrt();
    let scale = if std > EPSILON { 1.0 / std } else { 1.0 };

    let half = period.round().max(1.0) as isize;
    let window: Vec<f32> = (-half..=half)
        .map(|k| (-0.5 * (k as f32 * 32.0 / period).powi(2)).exp())
        .collect();

    (0..onset_env.len() as isize)
        .map(|i| {
            window
                .iter()
                .enumerate()
                .filter_map(|(w, &weight)| {
                    let j = i + w as isize - half;
                    (j >= 0 && (j as usize) < onset_env.len())
                        .then(|| weight * onset_env[j as usize] * scale)
                })
                .sum()
        })
        .collect()
}

/// Forward pass: best cumulative score per frame and its predecessor
fn cumulative_score(
    local: &[f32],
    period: f32,
    tightness: f32,
) -> (Vec<f32>, Vec<Option<usize>>) {
    let n = local.len();
    let min_interval = (period / 2.0).round().max(1.0) as usize;
    let max_interval = (2.0 * period).round().max(1.0) as usize;

    // Transition penalty for each look-back interval
    let penalty: Vec<f32> = (min_interval..=max_interval)
        .map(|d| -tightness * (d as f32 / period).ln().powi(2))
        .collect();

    let mut cumulative = vec![0.0f32; n];
    let mut backlinks = vec![None; n];
    // The first beat may start anywhere, but not before the first real onset
    let onset_floor = 0.01 * local.iter().copied().fold(0.0f32, f32::max);
    let mut first_beat = true;

    for i in 0..n {
        let mut best: Option<(usize, f32)> = None;
        for (offset, &p) in penalty.iter().enumerate() {
            let d = min_interval + offset;
            if d > i {
                break;
            }
            let score = cumulative[i - d] + p;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i - d, score));
            }
        }

        match best {
            Some((prev, score)) if !first_beat => {
                cumulative[i] = local[i] + score;
                backlinks[i] = Some(prev);
            }
            _ => cumulative[i] = local[i],
        }

        if first_beat && local[i] > onset_floor {
            first_beat = false;
        }
    }

    (cumulative, backlinks)
}

/// Last local maximum of the cumulative score that reaches half the median peak
fn last_beat(cumulative: &[f32]) -> Option<usize> {
    let n = cumulative.len();
    if n == 0 {
        return None;
    }

    let peaks: Vec<usize> = (0..n)
        .filter(|&i| {
            let left = if i > 0 { cumulative[i - 1] } else { f32::NEG_INFINITY };
            let right = if i + 1 < n { cumulative[i + 1] } else { f32::NEG_INFINITY };
            cumulative[i] > left && cumulative[i] >= right
        })
        .collect();

    if peaks.is_empty() {
        return Some(n - 1);
    }

    let mut values: Vec<f32> = peaks.iter().map(|&i| cumulative[i]).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = values[values.len() / 2];

    peaks
        .iter()
        .rev()
        .copied()
        .find(|&i| cumulative[i] >= 0.5 * median)
}

/// Remove leading and trailing beats whose local score is below half the
/// RMS local score over the tracked beats
fn trim_beats(local: &[f32], beats: Vec<usize>) -> Vec<usize> {
    if beats.is_empty() {
        return beats;
    }
    let rms = (beats.iter().map(|&b| local[b].powi(2)).sum::<f32>() / beats.len() as f32).sqrt();
    let threshold = 0.5 * rms;

    let start = beats.iter().position(|&b| local[b] >= threshold);
    let end = beats.iter().rposition(|&b| local[b] >= threshold);
    match (start, end) {
        (Some(s), Some(e)) => beats[s..=e].to_vec(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 22050;
    const HOP: usize = 512;

    fn pulse_envelope(n_frames: usize, period_frames: f32, start: f32) -> Vec<f32> {
        let mut env = vec![0.0f32; n_frames];
        let mut t = start;
        while (t.round() as usize) < n_frames {
            env[t.round() as usize] = 1.0;
            t += period_frames;
        }
        env
    }

    #[test]
    fn test_silence_has_no_beats() {
        let env = vec![0.0f32; 400];
        let beats = track_beats(&env, 120.0, SR, HOP, 100.0).unwrap();
        assert!(beats.is_empty());
    }

    #[test]
    fn test_regular_pulses_are_tracked() {
        let frame_rate = SR as f32 / HOP as f32;
        let period = 60.0 * frame_rate / 120.0;
        let env = pulse_envelope(860, period, 10.0);

        let beats = track_beats(&env, 120.0, SR, HOP, 100.0).unwrap();
        assert!(beats.len() >= 35, "expected ~40 beats, got {}", beats.len());

        // Ascending and spaced by roughly half a second
        for pair in beats.windows(2) {
            let interval = pair[1] - pair[0];
            assert!(
                (interval - 0.5).abs() < 0.06,
                "beat interval {:.3}s too far from 0.5s",
                interval
            );
        }

        // Every tracked beat sits on a pulse
        for &b in &beats {
            let frame = (b * frame_rate).round() as usize;
            let near = (frame.saturating_sub(1)..=frame + 1).any(|f| env.get(f) == Some(&1.0));
            assert!(near, "beat at {:.3}s is not on a pulse", b);
        }
    }

    #[test]
    fn test_no_beats_before_first_onset() {
        let frame_rate = SR as f32 / HOP as f32;
        let period = 60.0 * frame_rate / 100.0;
        let env = pulse_envelope(900, period, 200.0);

        let beats = track_beats(&env, 100.0, SR, HOP, 100.0).unwrap();
        assert!(!beats.is_empty());
        assert!(beats[0] >= 199.0 / frame_rate);
    }

    #[test]
    fn test_invalid_params() {
        let env = vec![1.0f32; 10];
        assert!(track_beats(&env, 0.0, SR, HOP, 100.0).is_err());
        assert!(track_beats(&env, 120.0, SR, HOP, 0.0).is_err());
        assert!(track_beats(&env, 120.0, 0, HOP, 100.0).is_err());
        assert!(track_beats(&env, 120.0, SR, 0, 100.0).is_err());
    }
}
