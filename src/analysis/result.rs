//! Analysis result types
//!
//! `AnalysisRecord` is the validated, serializable summary of one recording.
//! Construction (and deserialization) rejects non-finite numbers, values
//! outside their documented ranges, and derived fields that disagree with
//! their sources.

use super::labels::{format_duration, rhythm_complexity_ratio, RhythmComplexity};
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

/// Note names by pitch class (0 = C)
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

impl Key {
    /// Pitch class of the tonic (0 = C, ..., 11 = B)
    pub fn root(&self) -> u32 {
        match self {
            Key::Major(i) | Key::Minor(i) => *i % 12,
        }
    }

    /// True for minor keys
    pub fn is_minor(&self) -> bool {
        matches!(self, Key::Minor(_))
    }

    /// Get the full key name (e.g., "C major", "A minor")
    ///
    /// # Example
    ///
    /// ```
    /// use soundprint::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).display_name(), "C major");
    /// assert_eq!(Key::Minor(9).display_name(), "A minor");
    /// ```
    pub fn display_name(&self) -> String {
        let mode = if self.is_minor() { "minor" } else { "major" };
        format!("{} {}", NOTE_NAMES[self.root() as usize], mode)
    }
}

/// Tempo, key and duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    /// Tempo in BPM
    pub tempo: f32,

    /// Detected key
    pub key: Key,

    /// Key name, e.g. "A minor"
    pub key_name: String,

    /// Key confidence (0.0-1.0)
    pub key_confidence: f32,

    /// Duration in seconds
    pub duration: f32,

    /// Duration as `m:ss`
    pub duration_formatted: String,
}

/// Mean and standard deviation of the spectral shape series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralSummary {
    /// Mean spectral centroid (Hz)
    pub centroid_mean: f32,
    /// Standard deviation of the spectral centroid (Hz)
    pub centroid_std: f32,
    /// Mean spectral rolloff (Hz)
    pub rolloff_mean: f32,
    /// Standard deviation of the spectral rolloff (Hz)
    pub rolloff_std: f32,
    /// Mean spectral bandwidth (Hz)
    pub bandwidth_mean: f32,
    /// Standard deviation of the spectral bandwidth (Hz)
    pub bandwidth_std: f32,
    /// Mean spectral contrast over all bands and frames (dB)
    pub contrast_mean: f32,
    /// Standard deviation of spectral contrast over all bands and frames (dB)
    pub contrast_std: f32,
}

/// Onset statistics, complexity and beats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmSummary {
    /// Mean onset strength
    pub onset_strength_mean: f32,

    /// Standard deviation of onset strength
    pub onset_strength_std: f32,

    /// Onset strength std / mean (0 for silence)
    pub complexity: f32,

    /// Complexity class
    pub complexity_label: RhythmComplexity,

    /// Beat times in seconds
    pub beat_times: Vec<f32>,
}

/// Cepstral statistics and harmonic content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimbreSummary {
    /// Per-coefficient MFCC mean
    pub mfcc_mean: Vec<f32>,

    /// Per-coefficient MFCC standard deviation
    pub mfcc_std: Vec<f32>,

    /// Harmonic ratio (0.0-1.0)
    pub harmonic_ratio: f32,

    /// Timbre description, e.g. "rich harmonic content and warm"
    pub description: String,
}

/// Mix-oriented summary values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionInsights {
    /// Mean spectral rolloff (Hz)
    pub brightness: f32,

    /// Mean spectral bandwidth (Hz)
    pub spectral_width: f32,

    /// Mean contrast of the lowest band over the mean of the other bands
    /// (0 when the latter is 0)
    pub contrast_ratio: f32,
}

/// Validated analysis of one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordParts", into = "RecordParts")]
pub struct AnalysisRecord {
    basic_info: BasicInfo,
    spectral: SpectralSummary,
    rhythm: RhythmSummary,
    timbre: TimbreSummary,
    production: ProductionInsights,
}

/// Unvalidated wire form of `AnalysisRecord`
#[derive(Serialize, Deserialize)]
struct RecordParts {
    basic_info: BasicInfo,
    spectral: SpectralSummary,
    rhythm: RhythmSummary,
    timbre: TimbreSummary,
    production: ProductionInsights,
}

impl TryFrom<RecordParts> for AnalysisRecord {
    type Error = AnalysisError;

    fn try_from(parts: RecordParts) -> Result<Self, Self::Error> {
        AnalysisRecord::new(
            parts.basic_info,
            parts.spectral,
            parts.rhythm,
            parts.timbre,
            parts.production,
        )
    }
}

impl From<AnalysisRecord> for RecordParts {
    fn from(record: AnalysisRecord) -> Self {
        Self {
            basic_info: record.basic_info,
            spectral: record.spectral,
            rhythm: record.rhythm,
            timbre: record.timbre,
            production: record.production,
        }
    }
}

impl AnalysisRecord {
    /// Build a record, validating every field
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if any number is non-finite,
    /// tempo is not positive, duration is negative, a confidence or the
    /// harmonic ratio lies outside [0, 1], the key root is not a pitch class,
    /// or the MFCC mean and std vectors differ in length. Derived fields must
    /// agree with their sources: `key_name` with `key`, `duration_formatted`
    /// with `duration`, and `complexity` with the onset strength statistics.
    pub fn new(
        basic_info: BasicInfo,
        spectral: SpectralSummary,
        rhythm: RhythmSummary,
        timbre: TimbreSummary,
        production: ProductionInsights,
    ) -> Result<Self, AnalysisError> {
        let record = Self {
            basic_info,
            spectral,
            rhythm,
            timbre,
            production,
        };
        record.validate()?;
        Ok(record)
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        let b = &self.basic_info;
        let s = &self.spectral;
        let r = &self.rhythm;
        let t = &self.timbre;
        let p = &self.production;

        let scalars = [
            ("tempo", b.tempo),
            ("key_confidence", b.key_confidence),
            ("duration", b.duration),
            ("centroid_mean", s.centroid_mean),
            ("centroid_std", s.centroid_std),
            ("rolloff_mean", s.rolloff_mean),
            ("rolloff_std", s.rolloff_std),
            ("bandwidth_mean", s.bandwidth_mean),
            ("bandwidth_std", s.bandwidth_std),
            ("contrast_mean", s.contrast_mean),
            ("contrast_std", s.contrast_std),
            ("onset_strength_mean", r.onset_strength_mean),
            ("onset_strength_std", r.onset_strength_std),
            ("complexity", r.complexity),
            ("harmonic_ratio", t.harmonic_ratio),
            ("brightness", p.brightness),
            ("spectral_width", p.spectral_width),
            ("contrast_ratio", p.contrast_ratio),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(invalid(format!("{} is not finite: {}", name, value)));
            }
        }

        let vectors = [
            ("beat_times", &r.beat_times),
            ("mfcc_mean", &t.mfcc_mean),
            ("mfcc_std", &t.mfcc_std),
        ];
        for (name, values) in vectors {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(invalid(format!("{} contains a non-finite value", name)));
            }
        }

        if b.tempo <= 0.0 {
            return Err(invalid(format!("tempo must be > 0, got {}", b.tempo)));
        }
        if b.duration < 0.0 {
            return Err(invalid(format!("duration must be >= 0, got {}", b.duration)));
        }
        if !(0.0..=1.0).contains(&b.key_confidence) {
            return Err(invalid(format!(
                "key_confidence must be in [0, 1], got {}",
                b.key_confidence
            )));
        }
        if !(0.0..=1.0).contains(&t.harmonic_ratio) {
            return Err(invalid(format!(
                "harmonic_ratio must be in [0, 1], got {}",
                t.harmonic_ratio
            )));
        }
        let (Key::Major(root) | Key::Minor(root)) = b.key;
        if root > 11 {
            return Err(invalid(format!("key root must be 0-11, got {}", root)));
        }
        if b.key_name != b.key.display_name() {
            return Err(invalid(format!(
                "key_name {:?} does not match key {}",
                b.key_name,
                b.key.display_name()
            )));
        }
        if b.duration_formatted != format_duration(b.duration) {
            return Err(invalid(format!(
                "duration_formatted {:?} does not match duration {}",
                b.duration_formatted, b.duration
            )));
        }
        let expected = rhythm_complexity_ratio(r.onset_strength_mean, r.onset_strength_std);
        if (r.complexity - expected).abs() > 1e-5 * expected.abs().max(1.0) {
            return Err(invalid(format!(
                "complexity {} does not match onset std / mean {}",
                r.complexity, expected
            )));
        }
        if t.mfcc_mean.len() != t.mfcc_std.len() {
            return Err(invalid(format!(
                "mfcc_mean has {} coefficients but mfcc_std has {}",
                t.mfcc_mean.len(),
                t.mfcc_std.len()
            )));
        }

        Ok(())
    }

    /// Tempo, key and duration
    pub fn basic_info(&self) -> &BasicInfo {
        &self.basic_info
    }

    /// Spectral shape statistics
    pub fn spectral(&self) -> &SpectralSummary {
        &self.spectral
    }

    /// Onset statistics and beats
    pub fn rhythm(&self) -> &RhythmSummary {
        &self.rhythm
    }

    /// Cepstral statistics and harmonic content
    pub fn timbre(&self) -> &TimbreSummary {
        &self.timbre
    }

    /// Production insights
    pub fn production(&self) -> &ProductionInsights {
        &self.production
    }

    /// Tempo in BPM
    pub fn tempo(&self) -> f32 {
        self.basic_info.tempo
    }

    /// Detected key
    pub fn key(&self) -> Key {
        self.basic_info.key
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.basic_info.duration
    }

    /// Harmonic ratio (0.0-1.0)
    pub fn harmonic_ratio(&self) -> f32 {
        self.timbre.harmonic_ratio
    }
}

fn invalid(msg: String) -> AnalysisError {
    AnalysisError::InvalidInput(format!("invalid analysis record: {}", msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> AnalysisRecord {
        AnalysisRecord::new(
            BasicInfo {
                tempo: 120.0,
                key: Key::Minor(9),
                key_name: Key::Minor(9).display_name(),
                key_confidence: 0.4,
                duration: 65.0,
                duration_formatted: "1:05".to_string(),
            },
            SpectralSummary {
                centroid_mean: 1800.0,
                centroid_std: 200.0,
                rolloff_mean: 3500.0,
                rolloff_std: 300.0,
                bandwidth_mean: 1500.0,
                bandwidth_std: 100.0,
                contrast_mean: 20.0,
                contrast_std: 5.0,
            },
            RhythmSummary {
                onset_strength_mean: 2.0,
                onset_strength_std: 1.0,
                complexity: 0.5,
                complexity_label: RhythmComplexity::Moderate,
                beat_times: vec![0.5, 1.0, 1.5],
            },
            TimbreSummary {
                mfcc_mean: vec![-200.0, 50.0],
                mfcc_std: vec![20.0, 5.0],
                harmonic_ratio: 0.8,
                description: "rich harmonic content and warm".to_string(),
            },
            ProductionInsights {
                brightness: 3500.0,
                spectral_width: 1500.0,
                contrast_ratio: 1.2,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_key_display_name() {
        assert_eq!(Key::Major(0).display_name(), "C major");
        assert_eq!(Key::Minor(9).display_name(), "A minor");
        assert_eq!(Key::Major(6).display_name(), "F# major");
        assert_eq!(Key::Minor(1).root(), 1);
    }

    #[test]
    fn test_record_accessors() {
        let record = sample_record();
        assert_eq!(record.tempo(), 120.0);
        assert_eq!(record.key(), Key::Minor(9));
        assert_eq!(record.duration(), 65.0);
        assert_eq!(record.harmonic_ratio(), 0.8);
        assert_eq!(record.basic_info().key_name, "A minor");
        assert_eq!(record.rhythm().beat_times.len(), 3);
    }

    #[test]
    fn test_record_rejects_invalid_values() {
        let record = sample_record();
        let parts = RecordParts::from(record.clone());

        let mut basic = parts.basic_info.clone();
        basic.tempo = 0.0;
        assert!(AnalysisRecord::new(
            basic,
            parts.spectral.clone(),
            parts.rhythm.clone(),
            parts.timbre.clone(),
            parts.production.clone()
        )
        .is_err());

        let mut spectral = parts.spectral.clone();
        spectral.centroid_mean = f32::NAN;
        assert!(AnalysisRecord::new(
            parts.basic_info.clone(),
            spectral,
            parts.rhythm.clone(),
            parts.timbre.clone(),
            parts.production.clone()
        )
        .is_err());

        let mut timbre = parts.timbre.clone();
        timbre.harmonic_ratio = 1.5;
        assert!(AnalysisRecord::new(
            parts.basic_info.clone(),
            parts.spectral.clone(),
            parts.rhythm.clone(),
            timbre,
            parts.production.clone()
        )
        .is_err());

        let mut timbre = parts.timbre.clone();
        timbre.mfcc_std.pop();
        assert!(AnalysisRecord::new(
            parts.basic_info,
            parts.spectral,
            parts.rhythm,
            timbre,
            parts.production
        )
        .is_err());
    }

    #[test]
    fn test_record_rejects_inconsistent_derived_fields() {
        let parts = RecordParts::from(sample_record());
        let build = |basic: BasicInfo, rhythm: RhythmSummary| {
            AnalysisRecord::new(
                basic,
                parts.spectral.clone(),
                rhythm,
                parts.timbre.clone(),
                parts.production.clone(),
            )
        };

        let mut basic = parts.basic_info.clone();
        basic.key_name = "C major".to_string();
        assert!(build(basic, parts.rhythm.clone()).is_err());

        let mut basic = parts.basic_info.clone();
        basic.duration_formatted = "2:00".to_string();
        assert!(build(basic, parts.rhythm.clone()).is_err());

        let mut rhythm = parts.rhythm.clone();
        rhythm.complexity = 0.9;
        assert!(build(parts.basic_info.clone(), rhythm).is_err());

        assert!(build(parts.basic_info.clone(), parts.rhythm.clone()).is_ok());
    }

    #[test]
    fn test_record_json_roundtrip_and_validation() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"basic_info\""));
        assert!(json.contains("\"moderate\""));

        let back: AnalysisRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);

        let tampered = json.replace("\"tempo\":120.0", "\"tempo\":-1.0");
        assert!(serde_json::from_str::<AnalysisRecord>(&tampered).is_err());

        let tampered = json.replace("\"key_name\":\"A minor\"", "\"key_name\":\"E minor\"");
        assert_ne!(tampered, json);
        assert!(serde_json::from_str::<AnalysisRecord>(&tampered).is_err());
    }
}
