// src/core/target.rs
use std::fmt;
use std::str::FromStr;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Deserialize};

use crate::error::LeakerError;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").expect("email pattern is valid")
});

static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}$").expect("domain pattern is valid")
});

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{10,15}$").expect("phone pattern is valid")
});

/// What kind of identifier a target is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Email,
    Username,
    Domain,
    Keyword,
    Phone,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Email => "email",
            TargetKind::Username => "username",
            TargetKind::Domain => "domain",
            TargetKind::Keyword => "keyword",
            TargetKind::Phone => "phone",
        }
    }

    /// Check whether an already normalized line has the shape this kind expects.
    ///
    /// Usernames and keywords accept any non-empty line.
    pub fn matches(&self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }

        match self {
            TargetKind::Email => EMAIL_PATTERN.is_match(line),
            TargetKind::Domain => DOMAIN_PATTERN.is_match(line),
            TargetKind::Phone => PHONE_PATTERN.is_match(line),
            TargetKind::Username | TargetKind::Keyword => true,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = LeakerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" => Ok(TargetKind::Email),
            "username" => Ok(TargetKind::Username),
            "domain" => Ok(TargetKind::Domain),
            "keyword" => Ok(TargetKind::Keyword),
            "phone" => Ok(TargetKind::Phone),
            other => Err(LeakerError::InvalidInput(format!("unknown target type: {}", other))),
        }
    }
}

/// A single identifier to enumerate, classified once before fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    value: String,
    kind: TargetKind,
}

impl Target {
    /// Create a target without validation. The value is used as given.
    pub fn new(value: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    /// Normalize a raw input line and accept it only if it has the expected shape
    pub fn parse_line(line: &str, kind: TargetKind) -> Option<Self> {
        let normalized = line.trim().to_lowercase();

        if kind.matches(&normalized) {
            Some(Self::new(normalized, kind))
        } else {
            None
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
