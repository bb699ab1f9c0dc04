use std::path::Path;
use config::{Config as ConfigLoader, FileFormat};
use tracing::{debug, warn};

use super::schema::Settings;
use crate::config_path;
use crate::error::{LeakerError, LeakerResult};

/// Load settings: built-in defaults, then the user file, then `LEAKER_*` variables
pub fn load_settings(config_path: Option<&Path>) -> LeakerResult<Settings> {
    let mut config_builder = ConfigLoader::builder();

    // Default configuration
    config_builder = config_builder.add_source(
        config::File::from_str(
            include_str!("../../config/default.toml"),
            FileFormat::Toml
        )
    );

    // User-provided configuration
    if let Some(path) = config_path {
        if path.exists() {
            debug!("Loading user configuration from: {}", path.display());
            config_builder = config_builder.add_source(config::File::from(path));
        } else {
            warn!("Specified configuration file not found: {}", path.display());
        }
    } else {
        let default_path = config_path::settings_path();
        if default_path.exists() {
            debug!("Loading configuration from: {}", default_path.display());
            config_builder = config_builder.add_source(config::File::from(default_path.as_path()));
        }
    }

    // Environment variables, e.g. LEAKER_TIMEOUT_SECS
    config_builder = config_builder.add_source(
        config::Environment::with_prefix("LEAKER")
    );

    let settings: Settings = config_builder
        .build()
        .map_err(|e| LeakerError::ConfigError(format!("Failed to build configuration: {}", e)))?
        .try_deserialize()
        .map_err(|e| LeakerError::ConfigError(format!("Failed to parse configuration: {}", e)))?;

    Ok(settings)
}
