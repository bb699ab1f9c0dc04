// src/osint/credentials.rs
use rand::seq::SliceRandom;
use tracing::debug;

/// Credentials held by one source.
///
/// A key is chosen at random on every search so load spreads across keys
/// without any shared rotation state.
#[derive(Debug, Clone)]
pub struct Credentials<T = String> {
    keys: Vec<T>,
}

impl<T> Default for Credentials<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<T> Credentials<T> {
    /// Replace every held key
    pub fn replace(&mut self, keys: Vec<T>) {
        self.keys = keys;
    }

    /// Pick one key at random, or `None` when the source has no keys configured
    pub fn pick(&self, source_name: &str) -> Option<&T> {
        let key = self.keys.choose(&mut rand::thread_rng());
        if key.is_none() {
            debug!(
                "Skipping the {} source because there was no API key/secret defined for it.",
                source_name
            );
        }
        key
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Credentials<String> {
    /// Keep only non-blank keys, trimmed
    pub fn from_raw(keys: Vec<String>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}
