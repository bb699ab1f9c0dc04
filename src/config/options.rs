// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::core::TargetKind;
use crate::reporting::{LineFormatter, OutputFormat};
use crate::utils::http::default_user_agent;
use crate::utils::{ExistingFile, SessionConfig};

/// Immutable snapshot of one invocation, built once at startup
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub kind: TargetKind,
    /// A single target, or a path to a file with one target per line
    pub targets: Option<String>,
    pub stdin: bool,
    pub sources: Vec<String>,
    pub timeout: Duration,
    pub rate_limit: bool,
    pub filter: bool,
    pub dedup: bool,
    pub format: OutputFormat,
    pub verbose: bool,
    pub output: Option<PathBuf>,
    pub existing_output: ExistingFile,
    pub provider_config: PathBuf,
    pub proxy: Option<String>,
    pub user_agent: String,
    pub insecure: bool,
}

impl RunOptions {
    /// Options for `kind` with every toggle at its default
    pub fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            targets: None,
            stdin: false,
            sources: vec![crate::osint::ALL_SOURCES.to_string()],
            timeout: Duration::from_secs(30),
            rate_limit: true,
            filter: true,
            dedup: true,
            format: OutputFormat::Plain,
            verbose: false,
            output: None,
            existing_output: ExistingFile::Refuse,
            provider_config: crate::config_path::provider_config_path(),
            proxy: None,
            user_agent: default_user_agent(),
            insecure: false,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            proxy: self.proxy.clone(),
            insecure: self.insecure,
        }
    }

    pub fn formatter(&self) -> LineFormatter {
        LineFormatter::new(self.format, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunOptions::new(TargetKind::Email);
        assert_eq!(options.sources, vec!["all"]);
        assert!(options.rate_limit && options.filter && options.dedup);
        assert_eq!(options.existing_output, ExistingFile::Refuse);
        assert!(options.user_agent.starts_with("leaker/"));
    }

    #[test]
    fn test_session_config_mirrors_transport_options() {
        let mut options = RunOptions::new(TargetKind::Domain);
        options.timeout = Duration::from_secs(5);
        options.proxy = Some("http://127.0.0.1:8080".to_string());
        options.insecure = true;

        let session = options.session_config();
        assert_eq!(session.timeout, Duration::from_secs(5));
        assert_eq!(session.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(session.insecure);
    }
}
