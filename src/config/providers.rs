// src/config/providers.rs
//! Provider credential file: a YAML map of lower-case source name to a list
//! of keys, e.g.
//!
//! ```yaml
//! leakcheck:
//!   - 0123456789abcdef
//! intelx:
//!   - 2.intelx.io:00000000-0000-0000-0000-000000000000
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use config::{Config as ConfigLoader, FileFormat};
use tracing::{debug, error, info};

use crate::error::{LeakerError, LeakerResult};

/// Credentials keyed by lower-case source name
pub type ProviderCredentials = HashMap<String, Vec<String>>;

/// Pick the credential file to read.
///
/// An explicit path wins only if the file exists; otherwise the default
/// location is used.
pub fn resolve_provider_config(explicit: Option<&Path>, default: &Path) -> PathBuf {
    match explicit {
        Some(path) if path.is_file() => path.to_path_buf(),
        Some(path) => {
            debug!("Provider config {} not found, using {}", path.display(), default.display());
            default.to_path_buf()
        }
        None => default.to_path_buf(),
    }
}

/// Write a template listing every key-requiring source with no keys
pub fn create_provider_config(path: &Path, source_names: &[&str]) -> LeakerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| LeakerError::FileError {
            path: parent.to_path_buf(),
            message: format!("Failed to create directory: {}", e),
        })?;
    }

    let template: BTreeMap<String, Vec<String>> = source_names
        .iter()
        .map(|name| (name.to_lowercase(), Vec::new()))
        .collect();

    let yaml = serde_yaml::to_string(&template)
        .map_err(|e| LeakerError::ConfigError(format!("Failed to serialize provider config: {}", e)))?;

    std::fs::write(path, yaml).map_err(|e| LeakerError::FileError {
        path: path.to_path_buf(),
        message: format!("Failed to write provider config: {}", e),
    })
}

/// Create the default credential file on first run. Failure is logged only.
pub fn ensure_default_provider_config(path: &Path, source_names: &[&str]) {
    if path.exists() {
        return;
    }

    debug!("No default provider config file found: {}", path.display());
    debug!("Creating new default provider config at {}", path.display());
    if let Err(e) = create_provider_config(path, source_names) {
        error!("Could not create provider config file: {}", e);
    }
}

/// Read credentials from `path`.
///
/// A missing file yields no credentials. So does a malformed one, after an
/// error is logged: a broken key file never aborts a run.
pub fn load_provider_config(path: &Path) -> ProviderCredentials {
    info!("Loading provider config from {}", path.display());

    if !path.is_file() {
        debug!("Provider config {} does not exist", path.display());
        return ProviderCredentials::new();
    }

    match read_provider_config(path) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("Could not read providers from {}: {}", path.display(), e);
            ProviderCredentials::new()
        }
    }
}

fn read_provider_config(path: &Path) -> LeakerResult<ProviderCredentials> {
    let raw: HashMap<String, Option<Vec<String>>> = ConfigLoader::builder()
        .add_source(config::File::from(path).format(FileFormat::Yaml))
        .build()?
        .try_deserialize()?;

    Ok(raw
        .into_iter()
        .map(|(name, keys)| (name.to_lowercase(), keys.unwrap_or_default()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_create_lists_sources_with_empty_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("dir").join("provider-config.yaml");

        create_provider_config(&path, &["leakcheck", "intelx"]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("leakcheck: []"));
        assert!(content.contains("intelx: []"));
        assert!(load_provider_config(&path).values().all(Vec::is_empty));
    }

    #[test]
    fn test_load_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("provider-config.yaml");
        fs::write(
            &path,
            "leakcheck:\n  - key-one\n  - key-two\nintelx:\n  - 2.intelx.io:uuid\nsnusbase:\n",
        )
        .unwrap();

        let credentials = load_provider_config(&path);
        assert_eq!(credentials["leakcheck"], vec!["key-one", "key-two"]);
        assert_eq!(credentials["intelx"], vec!["2.intelx.io:uuid"]);
        assert!(credentials["snusbase"].is_empty());
    }

    #[test]
    fn test_malformed_file_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("provider-config.yaml");
        fs::write(&path, "leakcheck: [unterminated\n  - : :").unwrap();

        assert!(load_provider_config(&path).is_empty());
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(load_provider_config(&dir.path().join("absent.yaml")).is_empty());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("default.yaml");
        let explicit = dir.path().join("mine.yaml");

        assert_eq!(resolve_provider_config(Some(&explicit), &default), default);

        fs::write(&explicit, "{}").unwrap();
        assert_eq!(resolve_provider_config(Some(&explicit), &default), explicit);
        assert_eq!(resolve_provider_config(None, &default), default);
    }

    #[test]
    fn test_ensure_default_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("provider-config.yaml");
        fs::write(&path, "leakcheck:\n  - mine\n").unwrap();

        ensure_default_provider_config(&path, &["leakcheck"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "leakcheck:\n  - mine\n");
    }
}
