//! Audio preprocessing modules
//!
//! This module contains utilities for preparing audio for analysis:
//! - Channel mixing (multi-channel to mono)
//! - Sample-rate conversion to the analysis rate

pub mod channel_mixer;
pub mod resample;
