use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeakerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("invalid source {0} specified in -s flag")]
    InvalidSource(String),

    #[error("Invalid proxy provided: {0}")]
    InvalidProxy(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File error: {path:?} - {message}")]
    FileError {
        path: PathBuf,
        message: String,
    },

    #[error("file already exists: {0:?}")]
    FileExists(PathBuf),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("{source_name} returned status {status}: {body}")]
    UpstreamStatus {
        source_name: String,
        status: u16,
        body: String,
    },

    #[error("{source_name} error: {message}")]
    SourceError {
        source_name: String,
        message: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("finding channel closed")]
    ChannelClosed,

    #[error("{}", join_messages(.0))]
    Batch(Vec<LeakerError>),
}

impl LeakerError {
    /// Build a provider-scoped error from any displayable message
    pub fn source_error(source_name: &str, message: impl Into<String>) -> Self {
        LeakerError::SourceError {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    /// True when the consumer side of a finding stream went away.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, LeakerError::ChannelClosed)
    }
}

impl From<config::ConfigError> for LeakerError {
    fn from(error: config::ConfigError) -> Self {
        LeakerError::ConfigError(error.to_string())
    }
}

fn join_messages(errors: &[LeakerError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub type LeakerResult<T> = std::result::Result<T, LeakerError>;
