#[cfg(test)]
use std::collections::HashMap;

/// Source of environment variables
///
/// Settings are read through this trait so tests can supply values without
/// touching the process environment shared by parallel tests.
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory variables for tests
#[cfg(test)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

#[cfg(test)]
impl MockEnvironment {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn empty() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_vars(mut self, vars: &[(&str, &str)]) -> Self {
        for (key, value) in vars {
            self.vars.insert(key.to_string(), value.to_string());
        }
        self
    }
}

#[cfg(test)]
impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_environment_lookup() {
        let provider = MockEnvironment::empty()
            .with_var("UPLOAD_DIR", "/var/uploads")
            .with_vars(&[("HOST", "127.0.0.1"), ("PORT", "8080")]);

        assert_eq!(provider.get_var("UPLOAD_DIR"), Some("/var/uploads".to_string()));
        assert_eq!(provider.get_var("PORT"), Some("8080".to_string()));
        assert_eq!(provider.get_var("DATABASE_URL"), None);
    }

    #[test]
    fn test_mock_environment_from_map() {
        let provider = MockEnvironment::new(HashMap::from([(
            "JWT_SECRET".to_string(),
            "secret".to_string(),
        )]));

        assert_eq!(provider.get_var("JWT_SECRET"), Some("secret".to_string()));
        assert!(MockEnvironment::empty().get_var("JWT_SECRET").is_none());
    }
}
