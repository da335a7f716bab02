use crate::types::{AlignedPhoneme, AudioAnalysis, PhonemeToken};

pub trait PhonemeConverter: Send + Sync {
    /// Never returns an empty sequence.
    fn convert(&self, text: &str) -> Vec<PhonemeToken>;
}

pub trait AudioAnalyzer: Send + Sync {
    fn analyze(&self, samples: &[f32], sample_rate_hz: u32) -> AudioAnalysis;
}

pub trait PhonemeAligner: Send + Sync {
    /// Timestamps in the result must never decrease.
    fn align(&self, phonemes: &[PhonemeToken], analysis: &AudioAnalysis) -> Vec<AlignedPhoneme>;
}
