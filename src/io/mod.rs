//! Audio I/O modules
//!
//! Audio decoding (Symphonia) and the immutable sample buffer passed through the pipeline.

pub mod decoder;
pub mod sample_buffer;

pub use decoder::load;
pub use sample_buffer::AudioBuffer;
