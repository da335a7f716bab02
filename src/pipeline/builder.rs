use crate::config::VisemeConfig;
use crate::error::VisemeError;
use crate::lipsync::selector::TieBreakStrategy;
use crate::pipeline::defaults::{EnergyAudioAnalyzer, ProportionalAligner, SpanishGraphemeConverter};
use crate::pipeline::runtime::{VisemeGenerator, VisemeGeneratorParts};
use crate::pipeline::traits::{AudioAnalyzer, PhonemeAligner, PhonemeConverter};

pub struct VisemeGeneratorBuilder {
    config: VisemeConfig,
    tie_break: TieBreakStrategy,
    converter: Option<Box<dyn PhonemeConverter>>,
    analyzer: Option<Box<dyn AudioAnalyzer>>,
    aligner: Option<Box<dyn PhonemeAligner>>,
}

impl VisemeGeneratorBuilder {
    pub fn new(config: VisemeConfig) -> Self {
        Self {
            config,
            tie_break: TieBreakStrategy::default(),
            converter: None,
            analyzer: None,
            aligner: None,
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreakStrategy) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_converter(mut self, converter: Box<dyn PhonemeConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn with_analyzer(mut self, analyzer: Box<dyn AudioAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_aligner(mut self, aligner: Box<dyn PhonemeAligner>) -> Self {
        self.aligner = Some(aligner);
        self
    }

    pub fn build(self) -> Result<VisemeGenerator, VisemeError> {
        self.config.validate()?;
        let config = self.config;

        tracing::info!(
            sample_rate_hz = config.sample_rate_hz,
            frame_length = config.frame_length,
            hop_length = config.hop_length,
            top_db = config.top_db,
            tie_break = ?self.tie_break,
            "viseme generator ready"
        );

        Ok(VisemeGenerator::from_parts(VisemeGeneratorParts {
            sample_rate_hz: config.sample_rate_hz,
            dedup_window_secs: config.dedup_window_secs,
            fetch_timeout_secs: config.fetch_timeout_secs,
            max_fetch_bytes: config.max_fetch_bytes,
            tie_break: self.tie_break,
            analyzer: self
                .analyzer
                .unwrap_or_else(|| Box::new(EnergyAudioAnalyzer::from_config(&config))),
            aligner: self
                .aligner
                .unwrap_or_else(|| Box::new(ProportionalAligner::from_config(&config))),
            converter: self
                .converter
                .unwrap_or_else(|| Box::new(SpanishGraphemeConverter)),
        }))
    }
}
