use crate::config::VisemeConfig;
use crate::lipsync::graphemes::text_to_phonemes;
use crate::lipsync::timing::{align_phonemes, TimingParams};
use crate::lipsync::voice_activity::{analyze_clip, AnalysisParams};
use crate::pipeline::traits::{AudioAnalyzer, PhonemeAligner, PhonemeConverter};
use crate::types::{AlignedPhoneme, AudioAnalysis, PhonemeToken};

pub struct SpanishGraphemeConverter;

impl PhonemeConverter for SpanishGraphemeConverter {
    fn convert(&self, text: &str) -> Vec<PhonemeToken> {
        text_to_phonemes(text)
    }
}

pub struct EnergyAudioAnalyzer {
    params: AnalysisParams,
}

impl EnergyAudioAnalyzer {
    pub fn new(params: AnalysisParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &VisemeConfig) -> Self {
        Self::new(AnalysisParams {
            frame_length: config.frame_length,
            hop_length: config.hop_length,
            top_db: config.top_db,
            emphasis_percentile: config.emphasis_percentile,
        })
    }
}

impl AudioAnalyzer for EnergyAudioAnalyzer {
    fn analyze(&self, samples: &[f32], sample_rate_hz: u32) -> AudioAnalysis {
        analyze_clip(samples, sample_rate_hz, &self.params)
    }
}

pub struct ProportionalAligner {
    params: TimingParams,
}

impl ProportionalAligner {
    pub fn new(params: TimingParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &VisemeConfig) -> Self {
        Self::new(TimingParams {
            phonemes_per_second: config.phonemes_per_second,
            max_phonemes_per_interval: config.max_phonemes_per_interval,
            min_pause_secs: config.min_pause_secs,
        })
    }
}

impl PhonemeAligner for ProportionalAligner {
    fn align(&self, phonemes: &[PhonemeToken], analysis: &AudioAnalysis) -> Vec<AlignedPhoneme> {
        align_phonemes(phonemes, analysis, &self.params)
    }
}
