use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::config_spec::ConfigSpec;
use crate::config::errors::ApplicationError;

/// Bootstrap settings for infrastructure configuration
pub struct BootstrapSettings {
    database_url: String,
    content_database_url: String,
    server_host: String,
    server_port: u16,
    upload_dir: PathBuf,
}

impl BootstrapSettings {
    /// Load bootstrap settings through ConfigSpec, so every value gets the same
    /// env → default → validation treatment
    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ApplicationError> {
        let database_url_spec = ConfigSpec::new(env_provider.clone())
            .env_override("DATABASE_URL")
            .default_value("sqlite://ledger.db?mode=rwc")
            .min_length(1);

        let content_database_url_spec = ConfigSpec::new(env_provider.clone())
            .env_override("CONTENT_DATABASE_URL")
            .default_value("sqlite://content.db?mode=rwc")
            .min_length(1);

        let host_spec = ConfigSpec::new(env_provider.clone())
            .env_override("HOST")
            .default_value("0.0.0.0")
            .validator(ConfigSpec::validate_host_address);

        let port_spec = ConfigSpec::new(env_provider.clone())
            .env_override("PORT")
            .default_value("3000")
            .validator(|value| ConfigSpec::validate_port_range(value, 1, 65535));

        let upload_dir_spec = ConfigSpec::new(env_provider)
            .env_override("UPLOAD_DIR")
            .default_value("./uploads")
            .min_length(1);

        let database_url = database_url_spec.load_setting_with_source()?.value;
        let content_database_url = content_database_url_spec.load_setting_with_source()?.value;
        let server_host = host_spec.load_setting_with_source()?.value;
        let port_value = port_spec.load_setting_with_source()?.value;
        let server_port = ConfigSpec::parse_port(&port_value, "PORT")?;
        let upload_dir = PathBuf::from(upload_dir_spec.load_setting_with_source()?.value);

        Ok(Self {
            database_url,
            content_database_url,
            server_host,
            server_port,
            upload_dir,
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ApplicationError> {
        use crate::config::SystemEnvironment;
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn content_database_url(&self) -> &str {
        &self.content_database_url
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Address for the TCP listener
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("database_url", &self.database_url)
            .field("content_database_url", &self.content_database_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;
    use std::collections::HashMap;

    fn create_test_env(vars: HashMap<String, String>) -> Arc<MockEnvironment> {
        Arc::new(MockEnvironment::new(vars))
    }

    #[test]
    fn test_bootstrap_settings_with_all_vars() {
        let env_vars = HashMap::from([
            ("DATABASE_URL".to_string(), "sqlite://a.db".to_string()),
            ("CONTENT_DATABASE_URL".to_string(), "sqlite://b.db".to_string()),
            ("HOST".to_string(), "127.0.0.1".to_string()),
            ("PORT".to_string(), "8080".to_string()),
            ("UPLOAD_DIR".to_string(), "/srv/uploads".to_string()),
        ]);

        let settings = BootstrapSettings::from_env_provider(create_test_env(env_vars)).unwrap();

        assert_eq!(settings.database_url(), "sqlite://a.db");
        assert_eq!(settings.content_database_url(), "sqlite://b.db");
        assert_eq!(settings.server_address(), "127.0.0.1:8080");
        assert_eq!(settings.upload_dir(), Path::new("/srv/uploads"));
    }

    #[test]
    fn test_bootstrap_settings_with_defaults() {
        let settings = BootstrapSettings::from_env_provider(create_test_env(HashMap::new())).unwrap();

        assert_eq!(settings.database_url(), "sqlite://ledger.db?mode=rwc");
        assert_eq!(settings.content_database_url(), "sqlite://content.db?mode=rwc");
        assert_eq!(settings.server_host(), "0.0.0.0");
        assert_eq!(settings.server_port(), 3000);
        assert_eq!(settings.upload_dir(), Path::new("./uploads"));
    }

    #[test]
    fn test_bootstrap_settings_empty_content_url_fails_validation() {
        let env_vars = HashMap::from([("CONTENT_DATABASE_URL".to_string(), "".to_string())]);

        match BootstrapSettings::from_env_provider(create_test_env(env_vars)).unwrap_err() {
            ApplicationError::InvalidSetting { setting_name, reason } => {
                assert_eq!(setting_name, "CONTENT_DATABASE_URL");
                assert!(reason.contains("must be at least 1 characters long"));
            }
            other => panic!("Expected InvalidSetting, got: {:?}", other),
        }
    }

    #[test]
    fn test_bootstrap_settings_empty_host_fails_validation() {
        let env_vars = HashMap::from([("HOST".to_string(), "".to_string())]);

        match BootstrapSettings::from_env_provider(create_test_env(env_vars)).unwrap_err() {
            ApplicationError::InvalidSetting { setting_name, reason } => {
                assert_eq!(setting_name, "HOST");
                assert!(reason.contains("cannot be empty"));
            }
            other => panic!("Expected InvalidSetting for HOST, got: {:?}", other),
        }
    }

    #[test]
    fn test_bootstrap_settings_invalid_port() {
        let env_vars = HashMap::from([("PORT".to_string(), "not_a_number".to_string())]);

        match BootstrapSettings::from_env_provider(create_test_env(env_vars)).unwrap_err() {
            ApplicationError::InvalidSetting { setting_name, reason } => {
                assert_eq!(setting_name, "PORT");
                assert!(reason.contains("Expected port number between 1 and 65535"));
            }
            other => panic!("Expected InvalidSetting for PORT, got: {:?}", other),
        }
    }

    #[test]
    fn test_bootstrap_settings_zero_port() {
        let env_vars = HashMap::from([("PORT".to_string(), "0".to_string())]);

        match BootstrapSettings::from_env_provider(create_test_env(env_vars)).unwrap_err() {
            ApplicationError::InvalidSetting { setting_name, reason } => {
                assert_eq!(setting_name, "PORT");
                assert!(reason.contains("outside valid range"));
            }
            other => panic!("Expected InvalidSetting for zero PORT, got: {:?}", other),
        }
    }

    #[test]
    fn test_bootstrap_settings_debug_format() {
        let settings = BootstrapSettings::from_env_provider(create_test_env(HashMap::new())).unwrap();
        let debug = format!("{:?}", settings);

        assert!(debug.contains("content_database_url"));
        assert!(debug.contains("3000"));
    }
}
