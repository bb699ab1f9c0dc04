use serde::{Serialize, Deserialize};
use std::path::PathBuf;
use std::time::Duration;

/// Persistent settings, layered under the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Comma-separated source names, or `all`
    pub sources: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub proxy: Option<String>,
    pub insecure: bool,
    pub rate_limit: bool,
    #[serde(default)]
    pub provider_config: Option<PathBuf>,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Source names split out of the comma-separated setting
    pub fn source_list(&self) -> Vec<String> {
        split_list(&self.sources)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: "all".to_string(),
            timeout_secs: 30,
            user_agent: None,
            proxy: None,
            insecure: false,
            rate_limit: true,
            provider_config: None,
        }
    }
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
