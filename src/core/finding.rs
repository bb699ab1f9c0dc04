// src/core/finding.rs
use crate::error::LeakerError;

/// One unit of output from a provider: either a leaked value or an error
#[derive(Debug)]
pub struct Finding {
    pub source: String,
    pub outcome: Result<String, LeakerError>,
}

impl Finding {
    pub fn value(source: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            outcome: Ok(value.into()),
        }
    }

    pub fn error(source: impl Into<String>, error: LeakerError) -> Self {
        Self {
            source: source.into(),
            outcome: Err(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }
}
