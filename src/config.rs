use std::path::Path;

use serde::Deserialize;

use crate::error::VisemeError;

/// Tunables for the viseme pipeline. Every field has a default, so a JSON
/// config file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisemeConfig {
    pub sample_rate_hz: u32,
    pub frame_length: usize,
    pub hop_length: usize,
    /// Frames quieter than `peak - top_db` are treated as silence.
    pub top_db: f32,
    pub emphasis_percentile: f32,
    pub phonemes_per_second: f64,
    pub max_phonemes_per_interval: usize,
    pub min_pause_secs: f64,
    pub dedup_window_secs: f64,
    pub fetch_timeout_secs: u64,
    /// Size cap for downloaded clips and for clips read from disk.
    pub max_fetch_bytes: usize,
}

impl VisemeConfig {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 22_050;
    pub const DEFAULT_FRAME_LENGTH: usize = 2048;
    pub const DEFAULT_HOP_LENGTH: usize = 512;

    pub fn load(path: &Path) -> Result<Self, VisemeError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| VisemeError::io("read viseme config", e))?;
        serde_json::from_str(&data).map_err(|e| VisemeError::json("parse viseme config", e))
    }

    pub(crate) fn validate(&self) -> Result<(), VisemeError> {
        if self.sample_rate_hz == 0 {
            return Err(VisemeError::invalid_config("sample_rate_hz must be > 0"));
        }
        if self.hop_length == 0 || self.frame_length == 0 {
            return Err(VisemeError::invalid_config(
                "frame_length and hop_length must be > 0",
            ));
        }
        if self.frame_length < self.hop_length {
            return Err(VisemeError::invalid_config(format!(
                "frame_length ({}) must not be shorter than hop_length ({})",
                self.frame_length, self.hop_length
            )));
        }
        if !(0.0..=100.0).contains(&self.emphasis_percentile) {
            return Err(VisemeError::invalid_config(format!(
                "emphasis_percentile must be within [0, 100], got {}",
                self.emphasis_percentile
            )));
        }
        if !(self.top_db > 0.0) {
            return Err(VisemeError::invalid_config("top_db must be > 0"));
        }
        if !(self.phonemes_per_second > 0.0) || self.max_phonemes_per_interval == 0 {
            return Err(VisemeError::invalid_config(
                "phonemes_per_second and max_phonemes_per_interval must be > 0",
            ));
        }
        if self.min_pause_secs < 0.0 || self.dedup_window_secs < 0.0 {
            return Err(VisemeError::invalid_config(
                "min_pause_secs and dedup_window_secs must not be negative",
            ));
        }
        Ok(())
    }
}

impl Default for VisemeConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: Self::DEFAULT_SAMPLE_RATE_HZ,
            frame_length: Self::DEFAULT_FRAME_LENGTH,
            hop_length: Self::DEFAULT_HOP_LENGTH,
            top_db: 15.0,
            emphasis_percentile: 75.0,
            phonemes_per_second: 3.0,
            max_phonemes_per_interval: 4,
            min_pause_secs: 0.15,
            dedup_window_secs: 0.1,
            fetch_timeout_secs: 30,
            max_fetch_bytes: 32 * 1024 * 1024,
        }
    }
}
