// Database entities - SeaORM models

// Ledger database
pub mod achievement_reference;
pub mod lecturer;
pub mod permission;
pub mod refresh_token;
pub mod role;
pub mod role_permission;
pub mod student;
pub mod user;

// Content database
pub mod achievement_document;

pub use achievement_reference::AchievementStatus;

pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T> From<T> for AccessToken
where
    T: AsRef<str>,
{
    fn from(value: T) -> Self {
        Self(value.as_ref().to_owned())
    }
}

impl std::fmt::Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[access_token]")
    }
}
