//! Audio ingestion: container decoding, resampling and remote retrieval.

mod decode;
#[cfg(feature = "remote")]
mod fetch;
mod resample;

use std::path::PathBuf;

use crate::error::VisemeError;

pub use decode::{decode_bytes, decode_file, DecodedAudio};
#[cfg(feature = "remote")]
pub use fetch::fetch_audio;
pub use resample::resample_mono;

/// Where a clip comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    Path(PathBuf),
    Url(String),
}

impl AudioSource {
    /// `http://` and `https://` locations are remote, anything else is a path.
    pub fn parse(location: &str) -> Result<Self, VisemeError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(VisemeError::invalid_input("audio location is required"));
        }
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Self::Url(location.to_string()))
        } else {
            Ok(Self::Path(PathBuf::from(location)))
        }
    }
}

impl std::fmt::Display for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}
