//! Chroma extraction modules
//!
//! Extract pitch-class distribution (12 semitones) from audio:
//! - Chroma vector computation
//! - Normalization and averaging

pub mod extractor;
pub mod normalization;

pub use extractor::extract_chroma;
pub use normalization::mean_profile;
