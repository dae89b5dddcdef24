//! Key detection algorithm
//!
//! Correlates the mean chroma profile of a track with rotated binary key
//! templates.
//!
//! Binary templates give a major key and its relative minor the same pitch
//! classes, so they score identically. Ties are broken by the profile energy
//! at the candidate root, then major before minor, then lower root.

use super::{templates::KeyTemplates, KeyDetectionResult, KeyStrategy};
use crate::analysis::result::Key;
use crate::error::AnalysisError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Scores closer than this are treated as equal
const TIE_TOLERANCE: f32 = 1e-6;

/// Detect musical key from chroma vectors
///
/// # Arguments
///
/// * `chroma_vectors` - 12-element chroma vectors (one per frame)
/// * `strategy` - Template matching strategy
///
/// # Returns
///
/// Key detection result with the detected key, a confidence in [0, 1] and
/// all 24 Pearson scores ranked highest first
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the chroma vectors are empty or
/// not 12-dimensional.
///
/// # Example
///
/// ```
/// use soundprint::features::key::{detect_key, KeyStrategy};
/// use soundprint::Key;
///
/// // C major triad held for two frames
/// let mut frame = vec![0.0f32; 12];
/// frame[0] = 1.0;
/// frame[4] = 0.8;
/// frame[7] = 0.9;
/// let result = detect_key(&[frame.clone(), frame], KeyStrategy::RotationSearch)?;
/// assert_eq!(result.key, Key::Major(0));
/// # Ok::<(), soundprint::AnalysisError>(())
/// ```
pub fn detect_key(
    chroma_vectors: &[Vec<f32>],
    strategy: KeyStrategy,
) -> Result<KeyDetectionResult, AnalysisError> {
    log::debug!(
        "Detecting key from {} chroma vectors ({:?})",
        chroma_vectors.len(),
        strategy
    );

    if chroma_vectors.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Empty chroma vectors".to_string(),
        ));
    }

    for (i, chroma) in chroma_vectors.iter().enumerate() {
        if chroma.len() != 12 {
            return Err(AnalysisError::InvalidInput(format!(
                "Chroma vector at index {} has {} elements, expected 12",
                i,
                chroma.len()
            )));
        }
    }

    let profile = crate::features::chroma::mean_profile(chroma_vectors);
    Ok(detect_key_from_profile(&profile, strategy))
}

/// Detect musical key from an averaged 12-bin chroma profile
///
/// The profile is scaled to a unit maximum first, so the result does not
/// depend on its overall level. An all-zero profile yields C major with
/// confidence 0.
pub fn detect_key_from_profile(profile: &[f32; 12], strategy: KeyStrategy) -> KeyDetectionResult {
    let templates = KeyTemplates::new();
    let profile = &unit_max(profile);

    // Major keys first, then minor, each by ascending root
    let mut scores = Vec::with_capacity(24);
    for root in 0..12 {
        let score = pearson(profile, templates.get_major_template(root));
        scores.push((Key::Major(root), score));
    }
    for root in 0..12 {
        let score = pearson(profile, templates.get_minor_template(root));
        scores.push((Key::Minor(root), score));
    }

    let (key, confidence) = match strategy {
        KeyStrategy::RotationSearch => rotation_search(profile, &scores),
        KeyStrategy::ArgmaxRoot => argmax_root(profile, &templates),
    };

    let mut all_scores = scores;
    all_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    log::debug!(
        "Detected key: {} (confidence: {:.3})",
        key.display_name(),
        confidence
    );

    KeyDetectionResult {
        key,
        confidence,
        all_scores,
    }
}

/// Best of the 24 rotated templates with deterministic tie-breaking
///
/// Confidence is the margin between the best and second-best score over the
/// full score range.
fn rotation_search(profile: &[f32; 12], scores: &[(Key, f32)]) -> (Key, f32) {
    let mut best = scores[0];
    for &(key, score) in &scores[1..] {
        let better = if score > best.1 + TIE_TOLERANCE {
            true
        } else if (score - best.1).abs() <= TIE_TOLERANCE {
            // Iteration order already prefers major and lower roots
            profile[root_of(key)] > profile[root_of(best.0)] + EPSILON
        } else {
            false
        };
        if better {
            best = (key, score);
        }
    }

    let second = scores
        .iter()
        .filter(|(k, _)| *k != best.0)
        .map(|&(_, s)| s)
        .fold(f32::NEG_INFINITY, f32::max);
    let worst = scores.iter().map(|&(_, s)| s).fold(f32::INFINITY, f32::min);

    let range = best.1 - worst;
    let confidence = if range > EPSILON {
        ((best.1 - second) / range).clamp(0.0, 1.0)
    } else {
        0.0
    };

    (best.0, confidence)
}

/// Root from the strongest pitch class, mode from the C-rooted templates
///
/// Confidence is half the absolute difference of the two mode correlations.
fn argmax_root(profile: &[f32; 12], templates: &KeyTemplates) -> (Key, f32) {
    let mut root = 0usize;
    for (i, &v) in profile.iter().enumerate() {
        if v > profile[root] {
            root = i;
        }
    }

    let major_corr = pearson(profile, templates.get_major_template(0));
    let minor_corr = pearson(profile, templates.get_minor_template(0));

    let key = if minor_corr > major_corr + TIE_TOLERANCE {
        Key::Minor(root as u32)
    } else {
        Key::Major(root as u32)
    };
    let confidence = ((major_corr - minor_corr).abs() / 2.0).clamp(0.0, 1.0);

    (key, confidence)
}

/// Profile divided by its maximum; all zeros stay zeros
fn unit_max(profile: &[f32; 12]) -> [f32; 12] {
    let max = profile.iter().copied().fold(0.0f32, f32::max);
    if max < f32::MIN_POSITIVE {
        return [0.0; 12];
    }
    profile.map(|v| v / max)
}

fn root_of(key: Key) -> usize {
    match key {
        Key::Major(r) | Key::Minor(r) => r as usize % 12,
    }
}

/// Pearson correlation; 0 when either input has no variance
fn pearson(x: &[f32; 12], y: &[f32; 12]) -> f32 {
    let mean_x = x.iter().sum::<f32>() / 12.0;
    let mean_y = y.iter().sum::<f32>() / 12.0;

    let mut cov = 0.0f32;
    let mut var_x = 0.0f32;
    let mut var_y = 0.0f32;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom < EPSILON {
        return 0.0;
    }
    (cov / denom).clamp(-1.0, 1.0)
}
