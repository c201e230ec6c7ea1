// API-facing error types
pub mod achievement;
pub mod auth;

use poem_openapi::Object;

// Re-exports for convenience
pub use achievement::AchievementApiError;
pub use auth::AuthError;

/// Payload of an error envelope
#[derive(Object, Debug, Clone)]
pub struct ErrorData {
    /// Human-readable error message
    pub message: String,
}

/// Error envelope shared by every endpoint: `{status: "error", data: {message}}`
#[derive(Object, Debug, Clone)]
pub struct ErrorEnvelope {
    /// Always `error`
    pub status: String,

    pub data: ErrorData,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: ErrorData {
                message: message.into(),
            },
        }
    }
}

pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";
