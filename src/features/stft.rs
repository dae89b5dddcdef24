//! Short-time Fourier transform
//!
//! Every per-frame feature in this crate is derived from one [`Spectrogram`],
//! which is what keeps all series frame-aligned.
//!
//! Frames are not centered or padded: frame `t` covers samples
//! `[t * hop_size, t * hop_size + frame_size)`, so a buffer of `len` samples
//! yields `(len - frame_size) / hop_size + 1` frames.

use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f32::consts::PI;

/// Smallest amplitude considered by the dB conversion
const AMPLITUDE_FLOOR: f32 = 1e-5;

/// Dynamic range kept by the dB conversion
const TOP_DB: f32 = 80.0;

/// Overlap-add normalization below this window energy is treated as uncovered
const WINDOW_SUM_FLOOR: f32 = 1e-6;

/// Complex STFT with cached magnitudes
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Complex spectra, one per frame (`frame_size / 2 + 1` bins each)
    spectra: Vec<Vec<Complex<f32>>>,
    /// Magnitude spectra (n_frames × n_bins)
    magnitudes: Vec<Vec<f32>>,
    frame_size: usize,
    hop_size: usize,
    sample_rate: u32,
}

impl Spectrogram {
    /// Compute the Hann-windowed STFT of `samples`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InsufficientSamples` if `samples` is shorter
    /// than one frame, and `AnalysisError::InvalidInput` for zero sizes.
    pub fn compute(
        samples: &[f32],
        sample_rate: u32,
        frame_size: usize,
        hop_size: usize,
    ) -> Result<Self, AnalysisError> {
        if frame_size == 0 || hop_size == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Frame size and hop size must be > 0 (got {} / {})",
                frame_size, hop_size
            )));
        }
        if samples.len() < frame_size {
            return Err(AnalysisError::InsufficientSamples {
                samples: samples.len(),
                required: frame_size,
            });
        }

        let n_frames = frame_count(samples.len(), frame_size, hop_size);
        let n_bins = frame_size / 2 + 1;
        let window = hann_window(frame_size);

        log::debug!(
            "Computing STFT: {} samples, frame={}, hop={}, {} frames x {} bins",
            samples.len(),
            frame_size,
            hop_size,
            n_frames,
            n_bins
        );

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];

        let mut spectra = Vec::with_capacity(n_frames);
        let mut magnitudes = Vec::with_capacity(n_frames);

        for t in 0..n_frames {
            let start = t * hop_size;
            let frame = &samples[start..start + frame_size];
            for ((slot, &x), &w) in buffer.iter_mut().zip(frame).zip(&window) {
                *slot = Complex::new(x * w, 0.0);
            }
            fft.process(&mut buffer);

            let spectrum: Vec<Complex<f32>> = buffer[..n_bins].to_vec();
            magnitudes.push(spectrum.iter().map(|c| c.norm()).collect());
            spectra.push(spectrum);
        }

        Ok(Self {
            spectra,
            magnitudes,
            frame_size,
            hop_size,
            sample_rate,
        })
    }

    /// Number of frames
    pub fn n_frames(&self) -> usize {
        self.magnitudes.len()
    }

    /// Number of frequency bins per frame (`frame_size / 2 + 1`)
    pub fn n_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// FFT frame size
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Hop size between frames
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Sample rate of the analysed signal
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Complex spectra (n_frames × n_bins)
    pub fn spectra(&self) -> &[Vec<Complex<f32>>] {
        &self.spectra
    }

    /// Magnitude spectra (n_frames × n_bins)
    pub fn magnitudes(&self) -> &[Vec<f32>] {
        &self.magnitudes
    }

    /// Power spectra (squared magnitudes)
    pub fn power(&self) -> Vec<Vec<f32>> {
        self.magnitudes
            .iter()
            .map(|frame| frame.iter().map(|&m| m * m).collect())
            .collect()
    }

    /// Center frequency of every bin in Hz
    pub fn bin_frequencies(&self) -> Vec<f32> {
        bin_frequencies(self.sample_rate, self.frame_size)
    }

    /// Magnitudes in dB relative to the loudest bin, floored at -80 dB
    ///
    /// Intended for spectrogram displays. A silent spectrogram maps to all zeros.
    pub fn to_db(&self) -> Vec<Vec<f32>> {
        let max_mag = self
            .magnitudes
            .iter()
            .flat_map(|frame| frame.iter().copied())
            .fold(0.0f32, f32::max);
        let reference = 20.0 * max_mag.max(AMPLITUDE_FLOOR).log10();

        self.magnitudes
            .iter()
            .map(|frame| {
                frame
                    .iter()
                    .map(|&m| (20.0 * m.max(AMPLITUDE_FLOOR).log10() - reference).max(-TOP_DB))
                    .collect()
            })
            .collect()
    }
}

/// Number of non-padded frames for a signal of `len` samples
pub fn frame_count(len: usize, frame_size: usize, hop_size: usize) -> usize {
    if len < frame_size || hop_size == 0 {
        0
    } else {
        (len - frame_size) / hop_size + 1
    }
}

/// Periodic Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / n as f32).cos())
        .collect()
}

/// Bin center frequencies for a real FFT of size `frame_size`
pub fn bin_frequencies(sample_rate: u32, frame_size: usize) -> Vec<f32> {
    let bin_hz = sample_rate as f32 / frame_size as f32;
    (0..=frame_size / 2).map(|k| k as f32 * bin_hz).collect()
}

/// Inverse STFT by weighted overlap-add
///
/// Each half spectrum is mirrored to a full Hermitian spectrum, inverted,
/// windowed with the analysis Hann window and overlap-added; the result is
/// divided by the summed squared window. Samples no frame covers are 0.
///
/// # Arguments
///
/// * `spectra` - Half spectra (`frame_size / 2 + 1` bins each)
/// * `frame_size` - FFT size used for analysis
/// * `hop_size` - Hop size used for analysis
/// * `length` - Output length in samples
pub fn istft(
    spectra: &[Vec<Complex<f32>>],
    frame_size: usize,
    hop_size: usize,
    length: usize,
) -> Result<Vec<f32>, AnalysisError> {
    let n_bins = frame_size / 2 + 1;
    if let Some(bad) = spectra.iter().position(|s| s.len() != n_bins) {
        return Err(AnalysisError::InvalidInput(format!(
            "Spectrum at frame {} has {} bins, expected {}",
            bad,
            spectra[bad].len(),
            n_bins
        )));
    }

    let window = hann_window(frame_size);
    let mut planner = FftPlanner::<f32>::new();
    let ifft = planner.plan_fft_inverse(frame_size);
    let scale = 1.0 / frame_size as f32;

    let mut output = vec![0.0f32; length];
    let mut window_sum = vec![0.0f32; length];
    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];

    for (t, spectrum) in spectra.iter().enumerate() {
        buffer[..n_bins].copy_from_slice(spectrum);
        for k in n_bins..frame_size {
            buffer[k] = buffer[frame_size - k].conj();
        }
        ifft.process(&mut buffer);

        let start = t * hop_size;
        for (i, (c, &w)) in buffer.iter().zip(&window).enumerate() {
            let idx = start + i;
            if idx >= length {
                break;
            }
            output[idx] += c.re * scale * w;
            window_sum[idx] += w * w;
        }
    }

    for (y, &ws) in output.iter_mut().zip(&window_sum) {
        *y = if ws > WINDOW_SUM_FLOOR { *y / ws } else { 0.0 };
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_frame_count_matches_formula() {
        let samples = vec![0.0f32; 22050];
        let spec = Spectrogram::compute(&samples, 22050, 2048, 512).unwrap();
        assert_eq!(spec.n_frames(), (22050 - 2048) / 512 + 1);
        assert_eq!(spec.n_bins(), 1025);
        assert!(spec.magnitudes().iter().all(|f| f.len() == 1025));
    }

    #[test]
    fn test_exactly_one_window_gives_one_frame() {
        let samples = vec![0.0f32; 2048];
        let spec = Spectrogram::compute(&samples, 22050, 2048, 512).unwrap();
        assert_eq!(spec.n_frames(), 1);
    }

    #[test]
    fn test_short_buffer_is_insufficient() {
        let samples = vec![0.0f32; 2047];
        let result = Spectrogram::compute(&samples, 22050, 2048, 512);
        assert!(matches!(
            result,
            Err(AnalysisError::InsufficientSamples {
                samples: 2047,
                required: 2048
            })
        ));
    }

    #[test]
    fn test_sine_peak_bin() {
        let sr = 22050;
        let samples = sine(1000.0, sr, 8192);
        let spec = Spectrogram::compute(&samples, sr, 2048, 512).unwrap();
        let freqs = spec.bin_frequencies();
        let frame = &spec.magnitudes()[0];
        let peak = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert!((freqs[peak] - 1000.0).abs() < 11.0, "peak at {} Hz", freqs[peak]);
    }

    #[test]
    fn test_istft_reconstructs_interior() {
        let sr = 22050;
        let samples = sine(330.0, sr, 8192);
        let spec = Spectrogram::compute(&samples, sr, 2048, 512).unwrap();
        let rebuilt = istft(spec.spectra(), 2048, 512, samples.len()).unwrap();

        assert_eq!(rebuilt.len(), samples.len());
        for i in 2048..6000 {
            assert!(
                (rebuilt[i] - samples[i]).abs() < 1e-3,
                "sample {} differs: {} vs {}",
                i,
                rebuilt[i],
                samples[i]
            );
        }
    }

    #[test]
    fn test_db_of_silence_is_flat() {
        let samples = vec![0.0f32; 4096];
        let spec = Spectrogram::compute(&samples, 22050, 2048, 512).unwrap();
        let db = spec.to_db();
        assert!(db.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn test_db_is_relative_to_max() {
        let samples = sine(440.0, 22050, 4096);
        let spec = Spectrogram::compute(&samples, 22050, 2048, 512).unwrap();
        let db = spec.to_db();
        let max_db = db.iter().flatten().copied().fold(f32::MIN, f32::max);
        let min_db = db.iter().flatten().copied().fold(f32::MAX, f32::min);
        assert!(max_db.abs() < 1e-4);
        assert!(min_db >= -TOP_DB - 1e-4);
    }
}
