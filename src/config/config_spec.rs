use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::errors::ApplicationError;

#[derive(Debug, Clone)]
pub struct ConfigValue {
    pub value: String,
    pub source: ConfigValueSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValueSource {
    EnvironmentVariable { name: String },
    Default,
}

/// Configuration specification with environment override → default priority
pub struct ConfigSpec {
    env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    pub env_override: Option<String>,
    pub default_value: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub validator: Option<fn(&str) -> Result<(), String>>,
}

impl ConfigSpec {
    pub fn new(env_provider: Arc<dyn EnvironmentProvider + Send + Sync>) -> Self {
        Self {
            env_provider,
            env_override: None,
            default_value: None,
            min_length: None,
            max_length: None,
            validator: None,
        }
    }

    pub fn env_override(mut self, name: &str) -> Self {
        self.env_override = Some(name.to_string());
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = Some(length);
        self
    }

    pub fn validator(mut self, f: fn(&str) -> Result<(), String>) -> Self {
        self.validator = Some(f);
        self
    }

    /// Load a setting value with source tracking
    ///
    /// The environment variable wins when set, even if empty; otherwise the default applies.
    /// Both paths go through the same validation.
    pub fn load_setting_with_source(&self) -> Result<ConfigValue, ApplicationError> {
        let setting_name = self.setting_name();

        if let Some(env_var) = &self.env_override {
            if let Some(value) = self.env_provider.get_var(env_var) {
                self.validate_value(&value, env_var)?;

                return Ok(ConfigValue {
                    value,
                    source: ConfigValueSource::EnvironmentVariable {
                        name: env_var.clone(),
                    },
                });
            }
        }

        match &self.default_value {
            Some(default) => {
                self.validate_value(default, &setting_name)?;
                Ok(ConfigValue {
                    value: default.clone(),
                    source: ConfigValueSource::Default,
                })
            }
            None => Err(ApplicationError::MissingSetting { setting_name }),
        }
    }

    /// Validate a setting value according to the ConfigSpec rules
    pub fn validate_value(&self, value: &str, setting_name: &str) -> Result<(), ApplicationError> {
        if let Some(min_len) = self.min_length {
            if value.len() < min_len {
                return Err(ApplicationError::InvalidSetting {
                    setting_name: setting_name.to_string(),
                    reason: format!("Value must be at least {} characters long", min_len),
                });
            }
        }

        if let Some(max_len) = self.max_length {
            if value.len() > max_len {
                return Err(ApplicationError::InvalidSetting {
                    setting_name: setting_name.to_string(),
                    reason: format!("Value must be at most {} characters long", max_len),
                });
            }
        }

        if let Some(validator) = self.validator {
            validator(value).map_err(|reason| ApplicationError::InvalidSetting {
                setting_name: setting_name.to_string(),
                reason,
            })?;
        }

        Ok(())
    }

    fn setting_name(&self) -> String {
        self.env_override
            .clone()
            .unwrap_or_else(|| "unnamed_setting".to_string())
    }
}

/// Type parsing utilities for configuration values
impl ConfigSpec {
    /// Parse a port number from string with validation
    ///
    /// # Returns
    /// * `Ok(u16)` - Parsed port number
    /// * `Err(ApplicationError)` - Parse error or a zero port
    pub fn parse_port(value: &str, setting_name: &str) -> Result<u16, ApplicationError> {
        let port = value
            .trim()
            .parse::<u16>()
            .map_err(|e| ApplicationError::ParseError {
                setting_name: setting_name.to_string(),
                error: format!("Expected port number (1-65535), got '{}': {}", value, e),
            })?;

        if port == 0 {
            return Err(ApplicationError::InvalidSetting {
                setting_name: setting_name.to_string(),
                reason: "Port number must be between 1 and 65535".to_string(),
            });
        }

        Ok(port)
    }

    pub fn validate_port_range(value: &str, min: u16, max: u16) -> Result<(), String> {
        let parsed = value
            .parse::<u16>()
            .map_err(|_| format!("Expected port number between {} and {}", min, max))?;

        if parsed < min || parsed > max {
            return Err(format!("Port {} is outside valid range {}-{}", parsed, min, max));
        }

        Ok(())
    }

    /// Validate an IPv4 address format (4 dot-separated integers 0-255, no leading zeros)
    pub fn validate_ipv4_address(value: &str) -> Result<(), String> {
        let parts: Vec<&str> = value.split('.').collect();

        if parts.len() != 4 {
            return Err(format!(
                "IPv4 address must have exactly 4 parts separated by dots, got {}",
                parts.len()
            ));
        }

        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                return Err(format!("IPv4 address part {} cannot be empty", i + 1));
            }

            if part.len() > 1 && part.starts_with('0') {
                return Err(format!(
                    "IPv4 address part {} cannot have leading zeros: '{}'",
                    i + 1,
                    part
                ));
            }

            let octet = part
                .parse::<u16>()
                .map_err(|_| format!("IPv4 address part {} must be a number: '{}'", i + 1, part))?;

            if octet > 255 {
                return Err(format!(
                    "IPv4 address part {} must be between 0-255, got {}",
                    i + 1,
                    octet
                ));
            }
        }

        Ok(())
    }

    /// Validate a host address: IPv4 strictly, IPv6 loosely, hostnames for whitespace
    pub fn validate_host_address(value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Err("Host address cannot be empty".to_string());
        }

        if value.contains(':') {
            if value.starts_with('[') && value.ends_with(']') {
                let ipv6_part = &value[1..value.len() - 1];
                if ipv6_part.is_empty() || !ipv6_part.contains(':') {
                    return Err("Invalid IPv6 address format".to_string());
                }
            }
            return Ok(());
        }

        if value == "[]" {
            return Err("Invalid IPv6 address format".to_string());
        }

        if value.contains('.') {
            let parts: Vec<&str> = value.split('.').collect();
            if parts.len() == 4 && parts.iter().all(|part| part.chars().all(|c| c.is_ascii_digit())) {
                return Self::validate_ipv4_address(value);
            }
        }

        if value.chars().any(char::is_whitespace) {
            return Err("Host address cannot contain whitespace characters".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    fn env(vars: &[(&str, &str)]) -> Arc<MockEnvironment> {
        Arc::new(MockEnvironment::empty().with_vars(vars))
    }

    #[test]
    fn test_environment_overrides_default() {
        let value = ConfigSpec::new(env(&[("UPLOAD_DIR", "/srv/uploads")]))
            .env_override("UPLOAD_DIR")
            .default_value("./uploads")
            .load_setting_with_source()
            .unwrap();

        assert_eq!(value.value, "/srv/uploads");
        assert_eq!(
            value.source,
            ConfigValueSource::EnvironmentVariable {
                name: "UPLOAD_DIR".to_string()
            }
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        let value = ConfigSpec::new(env(&[]))
            .env_override("UPLOAD_DIR")
            .default_value("./uploads")
            .load_setting_with_source()
            .unwrap();

        assert_eq!(value.value, "./uploads");
        assert_eq!(value.source, ConfigValueSource::Default);
    }

    #[test]
    fn test_missing_without_default() {
        let result = ConfigSpec::new(env(&[]))
            .env_override("JWT_SECRET")
            .load_setting_with_source();

        match result {
            Err(ApplicationError::MissingSetting { setting_name }) => {
                assert_eq!(setting_name, "JWT_SECRET");
            }
            other => panic!("Expected MissingSetting, got: {:?}", other),
        }
    }

    #[test]
    fn test_length_limits() {
        let spec = ConfigSpec::new(env(&[])).min_length(2).max_length(4);

        assert!(spec.validate_value("ab", "X").is_ok());
        assert!(spec.validate_value("a", "X").is_err());
        assert!(spec.validate_value("abcde", "X").is_err());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(ConfigSpec::parse_port(" 8080 ", "PORT").unwrap(), 8080);
        assert!(matches!(
            ConfigSpec::parse_port("0", "PORT"),
            Err(ApplicationError::InvalidSetting { .. })
        ));
        assert!(matches!(
            ConfigSpec::parse_port("70000", "PORT"),
            Err(ApplicationError::ParseError { .. })
        ));
    }

    #[test]
    fn test_validate_host_address() {
        assert!(ConfigSpec::validate_host_address("0.0.0.0").is_ok());
        assert!(ConfigSpec::validate_host_address("localhost").is_ok());
        assert!(ConfigSpec::validate_host_address("[::1]").is_ok());
        assert!(ConfigSpec::validate_host_address("").is_err());
        assert!(ConfigSpec::validate_host_address("256.1.1.1").is_err());
        assert!(ConfigSpec::validate_host_address("01.1.1.1").is_err());
        assert!(ConfigSpec::validate_host_address("[]").is_err());
        assert!(ConfigSpec::validate_host_address("my host").is_err());
    }
}
