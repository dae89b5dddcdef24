//! Onset detection
//!
//! Frame-wise onset strength from spectral flux over a mel dB spectrogram.
//! The envelope drives both tempo estimation and beat tracking.

pub mod spectral_flux;

pub use spectral_flux::onset_strength;
