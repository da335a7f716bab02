use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisemeError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("audio decode failed ({context}): {message}")]
    AudioDecode {
        context: &'static str,
        message: String,
    },
    #[error("audio fetch failed for '{url}': {message}")]
    AudioFetch { url: String, message: String },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl VisemeError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn decode(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::AudioDecode {
            context,
            message: err.to_string(),
        }
    }

    #[cfg_attr(not(feature = "remote"), allow(dead_code))]
    pub(crate) fn fetch(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::AudioFetch {
            url: url.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// True when the caller supplied a bad request rather than the pipeline
    /// failing. Request-facing layers map this to a 400-class status.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

/// Wire shape of a failed generation: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&VisemeError> for ErrorBody {
    fn from(err: &VisemeError) -> Self {
        err.to_body()
    }
}
