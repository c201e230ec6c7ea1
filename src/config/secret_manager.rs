use std::fmt;
use std::sync::Arc;

use crate::config::{EnvironmentProvider, SecretConfig, SystemEnvironment};

#[derive(Debug)]
pub enum SecretError {
    Missing { secret_name: String },
    InvalidLength { secret_name: String, expected: usize, actual: usize },
}

impl SecretError {
    pub fn missing(secret_name: &str) -> Self {
        Self::Missing {
            secret_name: secret_name.to_string(),
        }
    }

    pub fn invalid_length(secret_name: &str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            secret_name: secret_name.to_string(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { secret_name } => {
                write!(f, "Required secret '{}' is missing", secret_name)
            }
            Self::InvalidLength { secret_name, expected, actual } => {
                write!(
                    f,
                    "Secret '{}' must be at least {} characters, got {}",
                    secret_name, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for SecretError {}

/// Holds the signing, hashing and peppering secrets for the process
pub struct SecretManager {
    jwt_secret: String,
    pepper: String,
    refresh_token_secret: String,
}

impl SecretManager {
    /// Load and validate all secrets from the process environment
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or too short
    pub fn init() -> Result<Self, SecretError> {
        Self::init_with_provider(Arc::new(SystemEnvironment))
    }

    pub fn init_with_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, SecretError> {
        let load = |config: SecretConfig| {
            let value = env_provider.get_var(config.secret_type.name());
            Self::validate_secret(&config, value)
        };

        Ok(Self {
            jwt_secret: load(Self::jwt_config())?,
            pepper: load(Self::pepper_config())?,
            refresh_token_secret: load(Self::refresh_token_config())?,
        })
    }

    /// Build a manager from literal values, applying the same length rules as `init`
    pub fn from_values(
        jwt_secret: &str,
        pepper: &str,
        refresh_token_secret: &str,
    ) -> Result<Self, SecretError> {
        Ok(Self {
            jwt_secret: Self::validate_secret(&Self::jwt_config(), Some(jwt_secret.to_string()))?,
            pepper: Self::validate_secret(&Self::pepper_config(), Some(pepper.to_string()))?,
            refresh_token_secret: Self::validate_secret(
                &Self::refresh_token_config(),
                Some(refresh_token_secret.to_string()),
            )?,
        })
    }

    fn jwt_config() -> SecretConfig {
        SecretConfig::env("JWT_SECRET").required(true).min_length(32)
    }

    fn pepper_config() -> SecretConfig {
        SecretConfig::env("PASSWORD_PEPPER").required(true).min_length(16)
    }

    fn refresh_token_config() -> SecretConfig {
        SecretConfig::env("REFRESH_TOKEN_SECRET").required(true).min_length(32)
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Pepper mixed into Argon2 password hashes
    pub fn pepper(&self) -> &str {
        &self.pepper
    }

    /// HMAC key for persisted refresh token hashes
    pub fn refresh_token_secret(&self) -> &str {
        &self.refresh_token_secret
    }

    fn validate_secret(config: &SecretConfig, value: Option<String>) -> Result<String, SecretError> {
        let name = config.secret_type.name();
        let value = match value {
            Some(v) => v,
            None if !config.required => return Ok(String::new()),
            None => return Err(SecretError::missing(name)),
        };

        if let Some(min_len) = config.min_length {
            if value.len() < min_len {
                return Err(SecretError::invalid_length(name, min_len, value.len()));
            }
        }

        Ok(value)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("jwt_secret", &"<redacted>")
            .field("pepper", &"<redacted>")
            .field("refresh_token_secret", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretManager {{ secrets_loaded: 3 }}")
    }
}
