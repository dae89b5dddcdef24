//! Audio decoding using Symphonia

use super::sample_buffer::AudioBuffer;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::downmix_interleaved;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode an audio file into a mono buffer at `config.sample_rate`
///
/// Multi-channel audio is averaged to mono, then resampled if the file's
/// native rate differs from the configured rate.
///
/// # Errors
///
/// Returns `AnalysisError::DecodeError` if the file cannot be opened, has no
/// decodable audio track, or decodes to zero samples.
///
/// # Example
///
/// ```no_run
/// use soundprint::{io::decoder::load, AnalysisConfig};
///
/// let buffer = load("track.mp3", &AnalysisConfig::default())?;
/// println!("{:.1}s at {} Hz", buffer.duration_seconds(), buffer.sample_rate());
/// # Ok::<(), soundprint::AnalysisError>(())
/// ```
pub fn load<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> Result<AudioBuffer, AnalysisError> {
    let path = path.as_ref();
    let (samples, native_rate) = decode_audio(path)?;

    if samples.is_empty() {
        return Err(AnalysisError::DecodeError(format!(
            "{} contains no audio samples",
            path.display()
        )));
    }

    let buffer = AudioBuffer::new(samples, native_rate)?;
    if native_rate != config.sample_rate {
        log::debug!(
            "Resampling {} from {} Hz to {} Hz",
            path.display(),
            native_rate,
            config.sample_rate
        );
    }
    buffer.resample(config.sample_rate)
}

/// Decode audio file to mono PCM samples at the file's native rate
///
/// # Arguments
///
/// * `path` - Path to audio file
///
/// # Returns
///
/// Tuple of (mono samples, sample_rate)
pub fn decode_audio(path: &Path) -> Result<(Vec<f32>, u32), AnalysisError> {
    log::debug!("Decoding audio file: {}", path.display());

    let file = File::open(path).map_err(|e| {
        AnalysisError::DecodeError(format!("cannot open {}: {}", path.display(), e))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            AnalysisError::DecodeError(format!("no audio track in {}", path.display()))
        })?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("Skipping undecodable packet in {}: {}", path.display(), msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        mono.extend(downmix_interleaved(sample_buf.samples(), spec.channels.count()));
    }

    if sample_rate == 0 {
        return Err(AnalysisError::DecodeError(format!(
            "unknown sample rate in {}",
            path.display()
        )));
    }

    log::info!(
        "Decoded audio: {} samples, {}Hz, {:.1}s",
        mono.len(),
        sample_rate,
        mono.len() as f32 / sample_rate as f32
    );

    Ok((mono, sample_rate))
}
