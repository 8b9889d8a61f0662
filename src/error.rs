//! Error types for the parley client

use thiserror::Error;

/// Result type alias for parley operations
pub type Result<T> = std::result::Result<T, Error>;

/// Remote pipeline stage that an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Speech-to-text transcription
    Stt,
    /// Retrieval-augmented query
    Query,
    /// Text-to-speech synthesis
    Tts,
    /// Document upload
    Upload,
    /// Document deletion
    Delete,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stt => "STT",
            Self::Query => "query",
            Self::Tts => "TTS",
            Self::Upload => "upload",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the parley client
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device or encoding error
    #[error("audio error: {0}")]
    Audio(String),

    /// Microphone access denied or device unavailable
    #[error("microphone unavailable: {0}")]
    Microphone(String),

    /// A remote service call failed (non-2xx response or transport failure)
    #[error("{stage} service error: {message}")]
    Service {
        /// Pipeline stage that failed
        stage: Stage,
        /// Human-readable failure detail
        message: String,
    },

    /// A remote service returned a body that does not match its schema
    #[error("{stage} service returned a malformed response: {message}")]
    MalformedResponse {
        /// Pipeline stage that produced the response
        stage: Stage,
        /// Decode failure detail
        message: String,
    },

    /// HTTP error outside any pipeline stage (e.g. health check)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// The remote stage this error is attributed to, if any
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Service { stage, .. } | Self::MalformedResponse { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
