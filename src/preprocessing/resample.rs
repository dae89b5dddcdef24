//! Sample-rate conversion
//!
//! Band-limited sinc interpolation (rubato) of a whole mono signal in one pass.

use crate::error::AnalysisError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Resample mono `samples` from `from_rate` to `to_rate`
///
/// # Returns
///
/// Resampled signal of length `round(len * to_rate / from_rate)`. Empty
/// input yields empty output.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero rate and
/// `AnalysisError::ProcessingError` if the resampler fails.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AnalysisError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid resampling rates: {} Hz -> {} Hz",
            from_rate, to_rate
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let expected_len = (samples.len() as f64 * ratio).round() as usize;

    log::debug!(
        "Resampling {} samples: {} Hz -> {} Hz (ratio {:.4})",
        samples.len(),
        from_rate,
        to_rate,
        ratio
    );

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, samples.len(), 1)?;

    // The resampler delays its output by a fixed number of frames; feed a
    // zero chunk afterwards to flush the tail, then drop the delay.
    let delay = resampler.output_delay();
    let mut output = resampler.process(&[samples], None)?.swap_remove(0);
    let flush = vec![0.0f32; samples.len()];
    output.extend(resampler.process(&[flush.as_slice()], None)?.swap_remove(0));

    let resampled: Vec<f32> = output
        .into_iter()
        .skip(delay)
        .chain(std::iter::repeat(0.0))
        .take(expected_len)
        .collect();

    Ok(resampled)
}
