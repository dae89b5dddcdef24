//! Chroma normalization strategies

/// Scale a chroma vector so its largest element is 1.0
///
/// Any positive maximum is normalized, however small, so the result does not
/// depend on input gain. All-zero vectors are left untouched and silence
/// stays silence instead of turning into NaN.
pub fn normalize_max(chroma: &mut [f32]) {
    let max = chroma.iter().copied().fold(0.0f32, f32::max);
    if max >= f32::MIN_POSITIVE {
        for c in chroma.iter_mut() {
            *c /= max;
        }
    }
}

/// Average chroma vectors over all frames
///
/// # Returns
///
/// 12-element mean profile; all zeros for an empty input
pub fn mean_profile(chroma_vectors: &[Vec<f32>]) -> [f32; 12] {
    let mut profile = [0.0f32; 12];
    if chroma_vectors.is_empty() {
        return profile;
    }
    for frame in chroma_vectors {
        for (p, &c) in profile.iter_mut().zip(frame) {
            *p += c;
        }
    }
    let n = chroma_vectors.len() as f32;
    for p in profile.iter_mut() {
        *p /= n;
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_max() {
        let mut chroma = vec![0.5, 2.0, 1.0];
        normalize_max(&mut chroma);
        assert_eq!(chroma, vec![0.25, 1.0, 0.5]);
    }

    #[test]
    fn test_normalize_tiny_frame() {
        let mut loud = vec![0.5, 2.0, 1.0];
        let mut quiet = vec![0.5e-20, 2.0e-20, 1.0e-20];
        normalize_max(&mut loud);
        normalize_max(&mut quiet);
        for (a, b) in loud.iter().zip(&quiet) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normalize_zero_is_noop() {
        let mut chroma = vec![0.0; 12];
        normalize_max(&mut chroma);
        assert!(chroma.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_mean_profile() {
        let mut a = vec![0.0; 12];
        a[0] = 1.0;
        let mut b = vec![0.0; 12];
        b[7] = 1.0;
        let profile = mean_profile(&[a, b]);
        assert_eq!(profile[0], 0.5);
        assert_eq!(profile[7], 0.5);
        assert_eq!(mean_profile(&[]), [0.0; 12]);
    }
}
