//! Spectral flux onset strength
//!
//! Onset strength at frame `t` is the mean over mel bands of the half-wave
//! rectified increase in log power since frame `t - 1`:
//!
//! `onset[t] = mean_b max(0, S_db[t][b] - S_db[t-1][b])`, with `onset[0] = 0`.
//!
//! The envelope has one value per STFT frame so it stays aligned with the
//! other frame-wise features.
//!
//! # Reference
//!
//! Böck, S., & Widmer, G. (2013). Maximum Filter Vibrato Suppression for Onset
//! Detection. *Proceedings of the 16th International Conference on Digital
//! Audio Effects (DAFx)*.

/// Compute the onset strength envelope from a log-power (dB) spectrogram
///
/// # Arguments
///
/// * `log_spec_frames` - dB spectrogram (n_frames × n_bands), typically mel bands
///
/// # Returns
///
/// Non-negative onset strength, one value per frame
pub fn onset_strength(log_spec_frames: &[Vec<f32>]) -> Vec<f32> {
    log::debug!(
        "Computing onset strength envelope: {} frames",
        log_spec_frames.len()
    );

    let mut envelope = Vec::with_capacity(log_spec_frames.len());
    if log_spec_frames.is_empty() {
        return envelope;
    }
    envelope.push(0.0);

    for pair in log_spec_frames.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let n = curr.len().min(prev.len());
        if n == 0 {
            envelope.push(0.0);
            continue;
        }
        let flux: f32 = curr
            .iter()
            .zip(prev)
            .map(|(&c, &p)| (c - p).max(0.0))
            .sum();
        envelope.push(flux / n as f32);
    }

    envelope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_spectrum_has_no_onsets() {
        let frames = vec![vec![-30.0f32; 16]; 10];
        let env = onset_strength(&frames);
        assert_eq!(env.len(), 10);
        assert!(env.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_step_produces_single_peak() {
        let mut frames = vec![vec![-80.0f32; 8]; 6];
        for frame in frames.iter_mut().skip(3) {
            for v in frame.iter_mut() {
                *v = -20.0;
            }
        }
        let env = onset_strength(&frames);
        assert_eq!(env[3], 60.0);
        assert!(env.iter().enumerate().all(|(i, &v)| i == 3 || v == 0.0));
    }

    #[test]
    fn test_decay_is_rectified() {
        let frames = vec![vec![0.0f32; 4], vec![-40.0f32; 4]];
        let env = onset_strength(&frames);
        assert_eq!(env, vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(onset_strength(&[]).is_empty());
    }
}
