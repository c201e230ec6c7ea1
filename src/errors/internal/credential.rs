use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    /// Unknown identifier, wrong password or deactivated account
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),

    #[error("Invalid token: {token_type} - {reason}")]
    InvalidToken { token_type: String, reason: String },

    #[error("Expired token: {0}")]
    ExpiredToken(String),

    #[error("User ID not found: {user_id}")]
    UserIdNotFound { user_id: String },
}

impl CredentialError {
    pub fn invalid_token(token_type: &str, reason: impl Into<String>) -> Self {
        CredentialError::InvalidToken {
            token_type: token_type.to_string(),
            reason: reason.into(),
        }
    }
}
