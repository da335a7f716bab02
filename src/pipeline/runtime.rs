use std::borrow::Cow;
use std::path::Path;
#[cfg(feature = "remote")]
use std::time::Duration;

use crate::audio::{self, AudioSource, DecodedAudio};
use crate::error::VisemeError;
use crate::lipsync::postprocess::collapse_near_duplicates;
use crate::lipsync::selector::{TieBreakStrategy, VisemeSelector};
use crate::pipeline::traits::{AudioAnalyzer, PhonemeAligner, PhonemeConverter};
use crate::types::{GenerationInput, GenerationRequest, Viseme, VisemeEvent, VisemeSequence};

pub struct VisemeGenerator {
    sample_rate_hz: u32,
    dedup_window_secs: f64,
    #[cfg_attr(not(feature = "remote"), allow(dead_code))]
    fetch_timeout_secs: u64,
    max_fetch_bytes: usize,
    tie_break: TieBreakStrategy,
    converter: Box<dyn PhonemeConverter>,
    analyzer: Box<dyn AudioAnalyzer>,
    aligner: Box<dyn PhonemeAligner>,
}

pub(crate) struct VisemeGeneratorParts {
    pub sample_rate_hz: u32,
    pub dedup_window_secs: f64,
    pub fetch_timeout_secs: u64,
    pub max_fetch_bytes: usize,
    pub tie_break: TieBreakStrategy,
    pub converter: Box<dyn PhonemeConverter>,
    pub analyzer: Box<dyn AudioAnalyzer>,
    pub aligner: Box<dyn PhonemeAligner>,
}

impl VisemeGenerator {
    pub(crate) fn from_parts(parts: VisemeGeneratorParts) -> Self {
        Self {
            sample_rate_hz: parts.sample_rate_hz,
            dedup_window_secs: parts.dedup_window_secs,
            fetch_timeout_secs: parts.fetch_timeout_secs,
            max_fetch_bytes: parts.max_fetch_bytes,
            tie_break: parts.tie_break,
            converter: parts.converter,
            analyzer: parts.analyzer,
            aligner: parts.aligner,
        }
    }

    /// Analysis rate; input at any other rate is resampled first.
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn generate(&self, input: &GenerationInput) -> Result<VisemeSequence, VisemeError> {
        if input.sample_rate_hz == 0 {
            return Err(VisemeError::invalid_input("sample_rate_hz must be > 0"));
        }

        if input.text.trim().is_empty() {
            return Ok(VisemeSequence {
                events: vec![VisemeEvent::new(Viseme::Neutral, 0.0)],
            });
        }

        let samples = if input.sample_rate_hz == self.sample_rate_hz {
            Cow::Borrowed(input.samples.as_slice())
        } else {
            tracing::debug!(
                from_hz = input.sample_rate_hz,
                to_hz = self.sample_rate_hz,
                "resampling input clip"
            );
            Cow::Owned(audio::resample_mono(
                &input.samples,
                input.sample_rate_hz,
                self.sample_rate_hz,
            ))
        };

        let phonemes = self.converter.convert(&input.text);
        let analysis = self.analyzer.analyze(&samples, self.sample_rate_hz);
        let aligned = self.aligner.align(&phonemes, &analysis);

        let mut selector = VisemeSelector::new(self.tie_break.build());
        let selected = selector.select(aligned.iter().copied());
        let events = collapse_near_duplicates(&selected, self.dedup_window_secs);

        tracing::debug!(
            phonemes = phonemes.len(),
            intervals = analysis.intervals.len(),
            aligned = aligned.len(),
            substitutions = selector.substitutions(),
            events = events.len(),
            duration_secs = format!("{:.3}", analysis.total_duration_secs),
            "viseme sequence generated"
        );
        Ok(VisemeSequence { events })
    }

    pub fn generate_from_decoded(
        &self,
        audio: DecodedAudio,
        text: &str,
    ) -> Result<VisemeSequence, VisemeError> {
        self.generate(&GenerationInput {
            sample_rate_hz: audio.sample_rate_hz,
            samples: audio.samples,
            text: text.to_string(),
        })
    }

    /// Decodes a WAV or FLAC clip held in memory.
    pub fn generate_from_bytes(&self, bytes: &[u8], text: &str) -> Result<VisemeSequence, VisemeError> {
        self.generate_from_decoded(audio::decode_bytes(bytes)?, text)
    }

    /// Reads a local clip, refusing files larger than `max_fetch_bytes`.
    pub fn generate_from_path(&self, path: &Path, text: &str) -> Result<VisemeSequence, VisemeError> {
        self.generate_from_decoded(audio::decode_file(path, self.max_fetch_bytes)?, text)
    }

    /// Downloads the clip into memory; the buffer is released when this
    /// call returns, whatever the outcome.
    #[cfg(feature = "remote")]
    pub fn generate_from_url(&self, url: &str, text: &str) -> Result<VisemeSequence, VisemeError> {
        if url.trim().is_empty() {
            return Err(VisemeError::invalid_input("audio_url is required"));
        }
        let bytes = audio::fetch_audio(
            url,
            Duration::from_secs(self.fetch_timeout_secs),
            self.max_fetch_bytes,
        )?;
        self.generate_from_bytes(&bytes, text)
    }

    pub fn generate_from_source(
        &self,
        source: &AudioSource,
        text: &str,
    ) -> Result<VisemeSequence, VisemeError> {
        match source {
            AudioSource::Path(path) => self.generate_from_path(path, text),
            #[cfg(feature = "remote")]
            AudioSource::Url(url) => self.generate_from_url(url, text),
            #[cfg(not(feature = "remote"))]
            AudioSource::Url(url) => Err(VisemeError::fetch(
                url.as_str(),
                "remote audio is not enabled in this build (enable the `remote` feature)",
            )),
        }
    }

    /// Entry point for request-shaped callers: `audio_url` is required and
    /// must be an `http(s)` URL, `text` defaults to empty. Local paths are
    /// refused here; trusted callers use [`Self::generate_from_path`].
    pub fn handle(&self, request: &GenerationRequest) -> Result<VisemeSequence, VisemeError> {
        let location = request
            .audio_url
            .as_deref()
            .ok_or_else(|| VisemeError::invalid_input("audio_url is required"))?;
        match AudioSource::parse(location)? {
            source @ AudioSource::Url(_) => self.generate_from_source(&source, &request.text),
            AudioSource::Path(_) => Err(VisemeError::invalid_input(
                "audio_url must be an http:// or https:// URL",
            )),
        }
    }
}
