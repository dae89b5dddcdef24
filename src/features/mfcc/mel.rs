//! Mel filterbank and log-power conversion

/// Smallest power considered by the dB conversion
const POWER_FLOOR: f32 = 1e-10;

/// Dynamic range kept below the loudest mel band (dB)
const TOP_DB: f32 = 80.0;

/// Triangular mel-spaced filterbank over a real FFT
///
/// Filters are area-normalized (each triangle is scaled by
/// `2 / (upper_hz - lower_hz)`), so a broadband signal yields comparable
/// energy in narrow low bands and wide high bands.
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    /// Sparse weights per filter: (bin index, weight)
    filters: Vec<Vec<(usize, f32)>>,
}

impl MelFilterbank {
    /// Build `n_mels` filters spanning 0 Hz to Nyquist
    ///
    /// # Arguments
    ///
    /// * `n_mels` - Number of mel bands (default: 128)
    /// * `frame_size` - FFT size
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(n_mels: usize, frame_size: usize, sample_rate: u32) -> Self {
        let n_bins = frame_size / 2 + 1;
        let bin_hz = sample_rate as f32 / frame_size as f32;
        let mel_max = hz_to_mel(sample_rate as f32 / 2.0);

        // n_mels + 2 equally spaced points on the mel axis
        let points: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
            .collect();

        let mut filters = Vec::with_capacity(n_mels);
        for m in 0..n_mels {
            let (lower, center, upper) = (points[m], points[m + 1], points[m + 2]);
            let norm = 2.0 / (upper - lower);

            let mut weights = Vec::new();
            for bin in 0..n_bins {
                let f = bin as f32 * bin_hz;
                if f <= lower || f >= upper {
                    continue;
                }
                let w = if f <= center {
                    (f - lower) / (center - lower)
                } else {
                    (upper - f) / (upper - center)
                };
                if w > 0.0 {
                    weights.push((bin, w * norm));
                }
            }
            filters.push(weights);
        }

        let empty = filters.iter().filter(|f| f.is_empty()).count();
        if empty > 0 {
            log::debug!(
                "{} of {} mel filters cover no FFT bin (frame_size {} too small for n_mels)",
                empty,
                n_mels,
                frame_size
            );
        }

        Self { filters }
    }

    /// Number of mel bands
    pub fn n_mels(&self) -> usize {
        self.filters.len()
    }

    /// Project one power frame onto the filterbank
    pub fn apply(&self, power_frame: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|weights| {
                weights
                    .iter()
                    .filter_map(|&(bin, w)| power_frame.get(bin).map(|&p| p * w))
                    .sum()
            })
            .collect()
    }

    /// Mel power spectrogram (n_frames × n_mels)
    pub fn spectrogram(&self, power: &[Vec<f32>]) -> Vec<Vec<f32>> {
        power.iter().map(|frame| self.apply(frame)).collect()
    }
}

/// Convert a power spectrogram to dB, clamped to 80 dB below its maximum
pub fn power_to_db(power: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let mut db: Vec<Vec<f32>> = power
        .iter()
        .map(|frame| {
            frame
                .iter()
                .map(|&p| 10.0 * p.max(POWER_FLOOR).log10())
                .collect()
        })
        .collect();

    let max_db = db
        .iter()
        .flat_map(|frame| frame.iter().copied())
        .fold(f32::NEG_INFINITY, f32::max);
    if max_db.is_finite() {
        let floor = max_db - TOP_DB;
        for v in db.iter_mut().flat_map(|frame| frame.iter_mut()) {
            *v = v.max(floor);
        }
    }

    db
}

/// Hz to mel (HTK formula)
#[inline]
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Mel to Hz (HTK formula)
#[inline]
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_roundtrip() {
        for hz in [0.0f32, 100.0, 440.0, 1000.0, 8000.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 0.05);
        }
    }

    #[test]
    fn test_filterbank_shape() {
        let bank = MelFilterbank::new(40, 2048, 22050);
        assert_eq!(bank.n_mels(), 40);
        let frame = vec![1.0f32; 1025];
        let mel = bank.apply(&frame);
        assert_eq!(mel.len(), 40);
        assert!(mel.iter().all(|&e| e >= 0.0));
        assert!(mel.iter().any(|&e| e > 0.0));
    }

    #[test]
    fn test_tone_lands_in_matching_band() {
        let bank = MelFilterbank::new(40, 2048, 22050);
        let mut frame = vec![0.0f32; 1025];
        // ~1 kHz bin
        frame[93] = 1.0;
        let mel = bank.apply(&frame);
        let loudest = mel
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let mel_1k = hz_to_mel(1000.0) / hz_to_mel(11025.0) * 41.0;
        assert!((loudest as f32 - (mel_1k - 1.0)).abs() <= 1.5);
    }

    #[test]
    fn test_power_to_db_clamps_dynamic_range() {
        let power = vec![vec![1.0, 1e-12, 0.0]];
        let db = power_to_db(&power);
        assert!((db[0][0] - 0.0).abs() < 1e-5);
        assert!((db[0][1] + 80.0).abs() < 1e-4);
        assert!((db[0][2] + 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_power_to_db_silence() {
        let power = vec![vec![0.0f32; 4]; 2];
        let db = power_to_db(&power);
        assert!(db.iter().flatten().all(|&v| (v + 100.0).abs() < 1e-4));
    }
}
