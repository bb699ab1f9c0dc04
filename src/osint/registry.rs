// src/osint/registry.rs
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{LeakerError, LeakerResult};
use super::LeakSource;
use super::sources::{
    BreachDirectory, DeHashed, IntelX, LeakCheck, LeakLookup, LeakSight, OsintLeak, ProxyNova, Snusbase,
};

/// Sentinel that selects every registered source
pub const ALL_SOURCES: &str = "all";

/// Registry of every available leak source.
///
/// Sources are configured (credentials injected) while the registry owns
/// them mutably, then frozen into shared handles by [`SourceRegistry::select`].
pub struct SourceRegistry {
    sources: Vec<Box<dyn LeakSource>>,
}

impl SourceRegistry {
    /// Create a registry holding the built-in sources
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(Box::new(LeakCheck::new()));
        registry.register(Box::new(ProxyNova::new()));
        registry.register(Box::new(OsintLeak::new()));
        registry.register(Box::new(IntelX::new()));
        registry.register(Box::new(BreachDirectory::new()));
        registry.register(Box::new(LeakLookup::new()));
        registry.register(Box::new(DeHashed::new()));
        registry.register(Box::new(Snusbase::new()));
        registry.register(Box::new(LeakSight::new()));

        registry
    }

    /// Create a registry with no sources
    pub fn empty() -> Self {
        Self { sources: Vec::new() }
    }

    /// Register a source, replacing one with the same name
    pub fn register(&mut self, source: Box<dyn LeakSource>) {
        let name = source.name();
        if let Some(position) = self.sources.iter().position(|s| s.name() == name) {
            debug!("Source '{}' already exists, replacing", name);
            self.sources[position] = source;
        } else {
            debug!("Registered source: {}", name);
            self.sources.push(source);
        }
    }

    /// Iterate over registered sources in registration order
    pub fn sources(&self) -> impl Iterator<Item = &dyn LeakSource> {
        self.sources.iter().map(|s| s.as_ref())
    }

    /// Names of every registered source
    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Inject credentials keyed by lower-case source name.
    ///
    /// Sources without an entry, or with an empty list, are left untouched.
    /// Returns how many sources received keys.
    pub fn load_credentials(&mut self, credentials: &HashMap<String, Vec<String>>) -> usize {
        let mut configured = 0;

        for source in self.sources.iter_mut() {
            let keys = match credentials.get(&source.name().to_lowercase()) {
                Some(keys) if !keys.is_empty() => keys.clone(),
                _ => continue,
            };

            debug!("Loaded {} credential(s) for source {}", keys.len(), source.name());
            source.add_credentials(keys);
            configured += 1;
        }

        configured
    }

    /// Validate a selection and freeze the chosen sources.
    ///
    /// Names are trimmed and lower-cased. Any unknown name fails the whole
    /// selection. `all` anywhere in the list selects every source.
    pub fn select(self, names: &[String]) -> LeakerResult<Vec<Arc<dyn LeakSource>>> {
        let wanted: Vec<String> = names
            .iter()
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();

        for name in &wanted {
            if name != ALL_SOURCES && !self.sources.iter().any(|s| s.name() == name) {
                return Err(LeakerError::InvalidSource(name.clone()));
            }
        }

        if wanted.is_empty() || wanted.iter().any(|n| n == ALL_SOURCES) {
            debug!("Configuring leaker to use all available sources");
            return Ok(self.sources.into_iter().map(Arc::from).collect());
        }

        debug!("Configuring leaker to use specified sources: {}", wanted.join(", "));
        Ok(self
            .sources
            .into_iter()
            .filter(|s| wanted.iter().any(|n| n == s.name()))
            .map(Arc::from)
            .collect())
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(selected: &[Arc<dyn LeakSource>]) -> Vec<&'static str> {
        selected.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_builtin_sources() {
        let registry = SourceRegistry::new();
        assert_eq!(
            registry.names(),
            vec![
                "leakcheck",
                "proxynova",
                "osintleak",
                "intelx",
                "breachdirectory",
                "leaklookup",
                "dehashed",
                "snusbase",
                "leaksight"
            ]
        );

        let keyless: Vec<_> = registry.sources().filter(|s| !s.needs_key()).map(|s| s.name()).collect();
        assert_eq!(keyless, vec!["proxynova"]);
    }

    #[test]
    fn test_select_all() {
        let selected = SourceRegistry::new().select(&["all".to_string()]).unwrap();
        assert_eq!(selected.len(), 9);
    }

    #[test]
    fn test_select_named_sources_case_insensitive() {
        let selected = SourceRegistry::new()
            .select(&[" ProxyNova ".to_string(), "DEHASHED".to_string()])
            .unwrap();
        assert_eq!(names(&selected), vec!["proxynova", "dehashed"]);
    }

    #[test]
    fn test_unknown_source_fails_fast() {
        let err = SourceRegistry::new()
            .select(&["proxynova".to_string(), "pastebin".to_string()])
            .err()
            .unwrap();
        assert!(matches!(err, LeakerError::InvalidSource(name) if name == "pastebin"));
    }

    #[test]
    fn test_load_credentials_only_touches_listed_sources() {
        let mut registry = SourceRegistry::new();
        let mut credentials = HashMap::new();
        credentials.insert("leakcheck".to_string(), vec!["key".to_string()]);
        credentials.insert("snusbase".to_string(), Vec::new());
        credentials.insert("unknown".to_string(), vec!["key".to_string()]);

        assert_eq!(registry.load_credentials(&credentials), 1);
    }
}
