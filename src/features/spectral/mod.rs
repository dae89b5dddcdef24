//! Spectral descriptor modules
//!
//! Frame-wise descriptors of spectral shape:
//! - Centroid, bandwidth and rolloff (magnitude spectrum)
//! - Octave-band spectral contrast (power spectrum)

pub mod contrast;
pub mod shape;

pub use contrast::spectral_contrast;
pub use shape::{bandwidth, centroid, rolloff, shape_series};
