// src/config_path.rs - Path utilities for finding configuration files
use std::path::PathBuf;

const APP_DIR: &str = "leaker";

/// Per-user configuration directory (`~/.config/leaker` on Linux).
///
/// Falls back to `./leaker` when the platform has no config directory.
pub fn app_config_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(APP_DIR),
        None => PathBuf::from(".").join(APP_DIR),
    }
}

/// Get the path to the settings file
pub fn settings_path() -> PathBuf {
    app_config_dir().join("config.toml")
}

/// Get the path to the default provider credentials file
pub fn provider_config_path() -> PathBuf {
    app_config_dir().join("provider-config.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_app_dir() {
        let dir = app_config_dir();
        assert!(dir.ends_with(APP_DIR));
        assert_eq!(settings_path().parent().unwrap(), dir);
        assert_eq!(provider_config_path().file_name().unwrap(), "provider-config.yaml");
    }
}
