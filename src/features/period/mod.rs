//! Period estimation
//!
//! Convert the onset strength envelope to a global tempo using
//! autocorrelation weighted by a log-normal tempo prior.

pub mod autocorrelation;

pub use autocorrelation::estimate_tempo;

/// Global tempo estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    /// Tempo in beats per minute (always > 0)
    pub bpm: f32,

    /// Normalized autocorrelation at the chosen lag (0.0-1.0);
    /// 0 when the envelope had no periodic energy and the prior centre was used
    pub confidence: f32,
}
