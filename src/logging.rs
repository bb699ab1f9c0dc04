//! Logging initialization.
//!
//! Diagnostics go to stderr through `tracing-subscriber` so that stdout only
//! ever carries results.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{LeakerError, LeakerResult};

/// Verbosity requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Debug,
}

impl LogLevel {
    /// `--quiet` wins over `--debug`
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => LogLevel::Quiet,
            (false, true) => LogLevel::Debug,
            (false, false) => LogLevel::Normal,
        }
    }

    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "error",
            LogLevel::Normal => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_logging(level: LogLevel) -> LeakerResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| LeakerError::ConfigError(format!("failed to initialize tracing subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(LogLevel::from_flags(false, false).directive(), "info");
        assert_eq!(LogLevel::from_flags(false, true).directive(), "debug");
        assert_eq!(LogLevel::from_flags(true, true).directive(), "error");
    }
}
