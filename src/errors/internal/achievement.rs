use thiserror::Error;

/// Outcome taxonomy of the achievement workflow
///
/// Each variant carries a human-readable message that is safe to return to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AchievementError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AchievementError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized("Authentication required".to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound("Achievement not found".to_string())
    }

    pub fn student_not_provisioned() -> Self {
        Self::NotFound("No student profile is provisioned for this user".to_string())
    }

    pub fn lecturer_not_provisioned() -> Self {
        Self::NotFound("No lecturer profile is provisioned for this user".to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }

    pub fn not_in_status(action: &str, required: &str) -> Self {
        Self::Conflict(format!(
            "Achievement cannot be {action}: only {required} achievements can be {action}"
        ))
    }

    /// Client-facing message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::ValidationFailed(message)
            | Self::Conflict(message) => message,
        }
    }
}
