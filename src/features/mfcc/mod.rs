//! Mel-frequency cepstral coefficients
//!
//! Pipeline: power spectrogram → mel filterbank → dB (80 dB range) →
//! orthonormal DCT-II per frame → first `n_mfcc` coefficients.

pub mod mel;

pub use mel::{power_to_db, MelFilterbank};

use std::f32::consts::PI;

/// Compute MFCCs from a mel dB spectrogram
///
/// # Arguments
///
/// * `mel_db` - Mel spectrogram in dB (n_frames × n_mels)
/// * `n_mfcc` - Number of coefficients to keep (default: 13)
///
/// # Returns
///
/// One `n_mfcc`-vector per frame
pub fn mfcc_from_mel_db(mel_db: &[Vec<f32>], n_mfcc: usize) -> Vec<Vec<f32>> {
    let n_mels = mel_db.first().map_or(0, |f| f.len());
    let basis = dct_basis(n_mels, n_mfcc);

    log::debug!(
        "Computing MFCC: {} frames, {} mel bands -> {} coefficients",
        mel_db.len(),
        n_mels,
        n_mfcc
    );

    mel_db
        .iter()
        .map(|frame| {
            basis
                .iter()
                .map(|row| row.iter().zip(frame).map(|(&b, &x)| b * x).sum())
                .collect()
        })
        .collect()
}

/// Orthonormal DCT-II basis rows `k = 0..n_out` for inputs of length `n`
fn dct_basis(n: usize, n_out: usize) -> Vec<Vec<f32>> {
    if n == 0 {
        return vec![Vec::new(); n_out];
    }
    let n_f = n as f32;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 {
                (1.0 / n_f).sqrt()
            } else {
                (2.0 / n_f).sqrt()
            };
            (0..n)
                .map(|i| scale * (PI * k as f32 * (2.0 * i as f32 + 1.0) / (2.0 * n_f)).cos())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_input_only_has_c0() {
        let mel_db = vec![vec![-20.0f32; 40]; 3];
        let mfcc = mfcc_from_mel_db(&mel_db, 13);
        assert_eq!(mfcc.len(), 3);
        for frame in &mfcc {
            assert_eq!(frame.len(), 13);
            // c0 = sqrt(N) * value for a constant vector
            assert!((frame[0] - (-20.0 * 40f32.sqrt())).abs() < 1e-2);
            assert!(frame[1..].iter().all(|c| c.abs() < 1e-3));
        }
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let basis = dct_basis(32, 8);
        for a in 0..8 {
            for b in 0..8 {
                let dot: f32 = basis[a].iter().zip(&basis[b]).map(|(x, y)| x * y).sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-4, "<{}, {}> = {}", a, b, dot);
            }
        }
    }
}
