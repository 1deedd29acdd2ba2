//! Checker configuration (sema.toml)
//!
//! ```toml
//! access_check_mode = "not-specified-restricted"
//! attachments_enabled = false
//!
//! [location]
//! kind = "string_location"
//! value = "test"
//! ```

use sema_types::Location;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read checker configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse checker configuration: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// How declarations without an access modifier are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessCheckMode {
    /// Every declaration must state its access
    #[default]
    Strict,
    /// A missing modifier means `access(self)`
    NotSpecifiedRestricted,
    /// A missing modifier means `access(all)`
    NotSpecifiedUnrestricted,
    /// Access modifiers are not validated
    None,
}

/// Options of a checking session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Treatment of missing access modifiers
    pub access_check_mode: AccessCheckMode,

    /// Whether attachment declarations are accepted
    pub attachments_enabled: bool,

    /// Identity of the checked program, qualifying its type keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            access_check_mode: AccessCheckMode::default(),
            attachments_enabled: true,
            location: None,
        }
    }
}

impl CheckerConfig {
    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from TOML
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: CheckerConfig = toml::from_str(content)?;
        tracing::debug!(mode = ?config.access_check_mode, "loaded checker configuration");
        Ok(config)
    }

    /// Use `location` to qualify declared types
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Use the given access check mode
    pub fn with_access_check_mode(mut self, mode: AccessCheckMode) -> Self {
        self.access_check_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = CheckerConfig::from_str("").unwrap();
        assert_eq!(config, CheckerConfig::default());
        assert_eq!(config.access_check_mode, AccessCheckMode::Strict);
        assert!(config.attachments_enabled);
    }

    #[test]
    fn test_parse_all_options() {
        let config = CheckerConfig::from_str(
            r#"
            access_check_mode = "not-specified-unrestricted"
            attachments_enabled = false

            [location]
            kind = "string_location"
            value = "test"
            "#,
        )
        .unwrap();

        assert_eq!(config.access_check_mode, AccessCheckMode::NotSpecifiedUnrestricted);
        assert!(!config.attachments_enabled);
        assert_eq!(
            config.location,
            Some(Location::StringLocation("test".to_string()))
        );
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = CheckerConfig::from_str(r#"access_check_mode = "lenient""#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_round_trip() {
        let config = CheckerConfig::default()
            .with_access_check_mode(AccessCheckMode::None)
            .with_location(Location::Address {
                address: 1,
                name: "Token".to_string(),
            });
        let serialized = toml::to_string_pretty(&config).unwrap();
        assert_eq!(CheckerConfig::from_str(&serialized).unwrap(), config);
    }
}
