//! Beat tracking
//!
//! Place a beat grid on the onset strength envelope given a global tempo
//! estimate, using dynamic programming.

pub mod dynamic_programming;

pub use dynamic_programming::track_beats;
