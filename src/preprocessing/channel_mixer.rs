//! Channel mixing utilities (multi-channel to mono conversion)

/// Average interleaved multi-channel samples down to mono
///
/// # Arguments
///
/// * `interleaved` - Interleaved samples (`[L, R, L, R, ...]` for stereo)
/// * `channels` - Number of interleaved channels
///
/// # Returns
///
/// Mono samples, one per input frame. A trailing partial frame is averaged
/// over the channels it contains.
pub fn downmix_interleaved(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_passthrough() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(downmix_interleaved(&samples, 1), samples);
    }

    #[test]
    fn test_stereo_average() {
        let samples = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        assert_eq!(downmix_interleaved(&samples, 2), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_opposite_channels_cancel() {
        let samples = vec![0.8, -0.8, 0.3, -0.3];
        let mono = downmix_interleaved(&samples, 2);
        assert!(mono.iter().all(|&x| x.abs() < 1e-7));
    }
}
