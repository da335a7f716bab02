use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorBody, VisemeError};

/// Every label the grapheme converter can produce.
const PHONEME_ALPHABET: &[&str] = &[
    "a", "e", "i", "o", "u", //
    "b", "c", "d", "f", "g", "h", "j", "k", "l", "m", "n", "ñ", "p", "q", "r", "s", "t", "v",
    "w", "x", "y", "z", "ç", //
    "ch", "ll", "rr", "gu", //
    "ai", "ay", "au", "ei", "ey", "eu", "oi", "oy", "ou", "ia", "ie", "io", "iu", "ua", "ue",
    "ui", "uo", //
    "sil", "neutral",
];

/// Grapheme-derived stand-in for a speech sound.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhonemeToken(&'static str);

impl PhonemeToken {
    pub const SILENCE: Self = Self("sil");
    pub const NEUTRAL: Self = Self("neutral");
    /// Vowel given to voiced intervals once the text has been used up.
    pub const FILLER: Self = Self("a");

    /// Looks `label` up in the fixed alphabet.
    pub fn from_label(label: &str) -> Option<Self> {
        PHONEME_ALPHABET
            .iter()
            .find(|&&known| known == label)
            .map(|&known| Self(known))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn is_silence(&self) -> bool {
        *self == Self::SILENCE
    }
}

impl fmt::Debug for PhonemeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for PhonemeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Speech span in seconds, `start_secs < end_secs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoicedInterval {
    pub start_secs: f64,
    pub end_secs: f64,
    /// Sample span `[start, end)` the interval was derived from.
    pub start_sample: usize,
    pub end_sample: usize,
}

impl VoicedInterval {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Frame-wise RMS energy of one clip and the emphasis threshold derived
/// from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyProfile {
    energies: Vec<f32>,
    threshold: f32,
    sample_rate_hz: u32,
    hop_length: usize,
}

impl EnergyProfile {
    pub(crate) fn new(
        energies: Vec<f32>,
        threshold: f32,
        sample_rate_hz: u32,
        hop_length: usize,
    ) -> Self {
        Self {
            energies,
            threshold,
            sample_rate_hz,
            hop_length,
        }
    }

    pub fn energies(&self) -> &[f32] {
        &self.energies
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Index of the frame covering `time_secs`, clamped to the last frame.
    pub fn frame_index(&self, time_secs: f64) -> Option<usize> {
        if self.energies.is_empty() {
            return None;
        }
        let raw = (time_secs.max(0.0) * self.sample_rate_hz as f64 / self.hop_length as f64)
            .floor() as usize;
        Some(raw.min(self.energies.len() - 1))
    }

    pub fn energy_at(&self, time_secs: f64) -> Option<f32> {
        self.frame_index(time_secs).map(|idx| self.energies[idx])
    }

    /// Strictly above the threshold counts as emphasis. An empty profile
    /// never emphasizes.
    pub fn is_emphasized(&self, time_secs: f64) -> bool {
        self.energy_at(time_secs)
            .is_some_and(|energy| energy > self.threshold)
    }
}

/// Everything the aligner needs to know about one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAnalysis {
    pub intervals: Vec<VoicedInterval>,
    pub energy: EnergyProfile,
    pub total_duration_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPhoneme {
    pub phoneme: PhonemeToken,
    pub timestamp: f64,
    pub emphasized: bool,
    /// Synthetic entry marking a long silence between voiced intervals.
    /// The selector treats it as a hard boundary.
    pub pause: bool,
}

impl AlignedPhoneme {
    pub fn new(phoneme: PhonemeToken, timestamp: f64, emphasized: bool) -> Self {
        Self {
            phoneme,
            timestamp,
            emphasized,
            pause: false,
        }
    }

    pub fn pause(timestamp: f64) -> Self {
        Self {
            phoneme: PhonemeToken::NEUTRAL,
            timestamp,
            emphasized: false,
            pause: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viseme {
    Aa,
    Ee,
    Ih,
    Oh,
    Ou,
    Neutral,
}

impl Viseme {
    pub const ALL: [Viseme; 6] = [
        Viseme::Aa,
        Viseme::Ee,
        Viseme::Ih,
        Viseme::Oh,
        Viseme::Ou,
        Viseme::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aa => "aa",
            Self::Ee => "ee",
            Self::Ih => "ih",
            Self::Oh => "oh",
            Self::Ou => "ou",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Viseme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisemeEvent {
    #[serde(rename = "visema")]
    pub viseme: Viseme,
    /// Seconds from the start of the clip.
    #[serde(rename = "tiempo")]
    pub time: f64,
}

impl VisemeEvent {
    pub fn new(viseme: Viseme, time: f64) -> Self {
        Self { viseme, time }
    }
}

/// Document consumed by the animation client: `{"visemas": [...]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisemeSequence {
    #[serde(rename = "visemas")]
    pub events: Vec<VisemeEvent>,
}

#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub sample_rate_hz: u32,
    /// Mono samples in `[-1, 1]`.
    pub samples: Vec<f32>,
    pub text: String,
}

/// Request-shaped input as received from an HTTP or batch caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub text: String,
    pub audio_url: Option<String>,
}

/// Either wire shape a generation call can answer with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerationResponse {
    Visemes(VisemeSequence),
    Error(ErrorBody),
}

impl From<Result<VisemeSequence, VisemeError>> for GenerationResponse {
    fn from(result: Result<VisemeSequence, VisemeError>) -> Self {
        match result {
            Ok(sequence) => Self::Visemes(sequence),
            Err(err) => Self::Error(err.to_body()),
        }
    }
}
