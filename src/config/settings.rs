//! Application settings configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// The base URL of the label service.
    pub service_url: String,
    /// The organization id sent with label creation requests, if any.
    pub org_id: Option<String>,
    /// Event loop tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8086".to_string(),
            org_id: None,
            tick_rate_ms: 100,
        }
    }
}

impl Settings {
    /// Validate these settings.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation
    /// fails.
    pub fn validate(&self) -> Result<()> {
        if self.service_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "service URL cannot be empty".to_string(),
            ));
        }

        if !self.service_url.starts_with("https://") && !self.service_url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "service URL '{}' must start with http:// or https://",
                self.service_url
            )));
        }

        if self.tick_rate_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick rate must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tick_rate_ms, 100);
        assert!(settings.org_id.is_none());
    }

    #[test]
    fn test_empty_url_is_invalid() {
        let settings = Settings {
            service_url: String::new(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_non_http_url_is_invalid() {
        let settings = Settings {
            service_url: "ftp://example.com".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_tick_rate_is_invalid() {
        let settings = Settings {
            tick_rate_ms: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str("service_url = \"http://example.com\"").unwrap();
        assert_eq!(settings.service_url, "http://example.com");
        assert_eq!(settings.tick_rate_ms, 100);
    }
}
