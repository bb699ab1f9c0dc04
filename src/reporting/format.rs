// src/reporting/format.rs
use serde::{Serialize, Deserialize};

use crate::error::LeakerResult;

/// Output format enum
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

/// One JSON line of structured output
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct JsonRecord<'a> {
    pub source: &'a str,
    pub value: &'a str,
    pub target: &'a str,
}

/// How a finding is rendered into a single output line
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormatter {
    pub format: OutputFormat,
    pub verbose: bool,
}

impl LineFormatter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Render one finding, without the trailing newline
    pub fn format(&self, source: &str, value: &str, target: &str) -> LeakerResult<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(&JsonRecord { source, value, target })?),
            OutputFormat::Plain if self.verbose => Ok(format!("[{}] {}", source, value)),
            OutputFormat::Plain => Ok(value.to_string()),
        }
    }
}
