//! Configuration management for labelpick.
//!
//! This module handles loading and saving user configuration from a TOML
//! file in the platform config directory.

mod settings;

use std::path::PathBuf;

use thiserror::Error;

pub use settings::Settings;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration directory could not be determined.
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// The configuration directory could not be created.
    #[error("Could not create configuration directory: {0}")]
    CreateDirError(std::io::Error),

    /// The configuration file could not be read.
    #[error("Could not read configuration file: {0}")]
    ReadError(std::io::Error),

    /// The configuration file could not be written.
    #[error("Could not write configuration file: {0}")]
    WriteError(std::io::Error),

    /// The configuration file is not valid TOML.
    #[error("Could not parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Could not serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Get the path of the configuration file.
///
/// Platform-specific:
/// - Linux: `~/.config/labelpick/config.toml`
/// - macOS: `~/Library/Application Support/labelpick/config.toml`
/// - Windows: `C:\Users\<User>\AppData\Roaming\labelpick\config.toml`
pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("labelpick").join("config.toml"))
}

/// Load settings from the configuration file.
///
/// A missing file is not an error; defaults are returned so first runs work
/// without any setup.
pub fn load() -> Result<Settings> {
    let path = config_path()?;
    load_from(&path)
}

/// Load settings from an explicit path.
pub fn load_from(path: &std::path::Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
    let settings: Settings = toml::from_str(&contents)?;
    settings.validate()?;
    Ok(settings)
}

/// Save settings to the configuration file, creating the directory if needed.
pub fn save(settings: &Settings) -> Result<()> {
    let path = config_path()?;
    save_to(settings, &path)
}

/// Save settings to an explicit path.
pub fn save_to(settings: &Settings, path: &std::path::Path) -> Result<()> {
    settings.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
    }

    let contents = toml::to_string_pretty(settings)?;
    std::fs::write(path, contents).map_err(ConfigError::WriteError)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_path_ends_with_expected_file() {
        let path = config_path().unwrap();
        assert!(path.ends_with("labelpick/config.toml"));
    }

    #[test]
    fn test_load_from_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.service_url = "http://example.com:8086".to_string();
        settings.org_id = Some("org1".to_string());
        settings.tick_rate_ms = 50;

        save_to(&settings, &path).unwrap();
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_from_invalid_toml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_save_invalid_settings_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.service_url = "ftp://wrong".to_string();

        let err = save_to(&settings, &path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
