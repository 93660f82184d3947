//! Session scoping configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Session scoping configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the instance this process serves.
    #[serde(default)]
    pub instance: Option<String>,
}

impl SessionConfig {
    /// Return the configured instance name.
    ///
    /// Fails with a configuration error when the instance is unset or blank.
    pub fn require_instance(&self) -> Result<&str, AppError> {
        self.instance
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::configuration("INSTANCE is not set"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_require_instance() {
        let config = SessionConfig {
            instance: Some("east".to_string()),
        };
        assert_eq!(config.require_instance().unwrap(), "east");
    }

    #[test]
    fn test_missing_or_blank_instance_is_configuration_error() {
        let missing = SessionConfig::default();
        assert_eq!(
            missing.require_instance().unwrap_err().kind,
            ErrorKind::Configuration
        );

        let blank = SessionConfig {
            instance: Some("  ".to_string()),
        };
        assert_eq!(
            blank.require_instance().unwrap_err().kind,
            ErrorKind::Configuration
        );
    }
}
