use crate::errors::internal::{AchievementError, CredentialError, InternalError, ProfileError};
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

use super::{ErrorEnvelope, INTERNAL_ERROR_MESSAGE};

/// Error responses of the achievement endpoints, one variant per HTTP status
#[derive(ApiResponse, Debug)]
pub enum AchievementApiError {
    /// Missing or invalid field, unknown enum value, rejected upload
    #[oai(status = 400)]
    ValidationFailed(Json<ErrorEnvelope>),

    /// Missing or invalid caller identity
    #[oai(status = 401)]
    Unauthorized(Json<ErrorEnvelope>),

    /// Authenticated but not allowed by role, permission or ownership
    #[oai(status = 403)]
    Forbidden(Json<ErrorEnvelope>),

    /// Achievement or profile does not exist
    #[oai(status = 404)]
    NotFound(Json<ErrorEnvelope>),

    /// Lifecycle precondition not met
    #[oai(status = 409)]
    Conflict(Json<ErrorEnvelope>),

    #[oai(status = 500)]
    InternalError(Json<ErrorEnvelope>),
}

impl AchievementApiError {
    pub fn unauthorized() -> Self {
        Self::from_domain(&AchievementError::unauthorized())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AchievementApiError::Forbidden(Json(ErrorEnvelope::new(message)))
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        AchievementApiError::ValidationFailed(Json(ErrorEnvelope::new(message)))
    }

    fn from_domain(err: &AchievementError) -> Self {
        let body = Json(ErrorEnvelope::new(err.message()));
        match err {
            AchievementError::Unauthorized(_) => AchievementApiError::Unauthorized(body),
            AchievementError::Forbidden(_) => AchievementApiError::Forbidden(body),
            AchievementError::NotFound(_) => AchievementApiError::NotFound(body),
            AchievementError::ValidationFailed(_) => AchievementApiError::ValidationFailed(body),
            AchievementError::Conflict(_) => AchievementApiError::Conflict(body),
        }
    }

    /// Convert InternalError to AchievementApiError
    ///
    /// Domain outcomes keep their message; infrastructure failures are logged
    /// and collapsed into a generic 500.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Achievement(domain) => {
                tracing::debug!("Achievement request refused: {}", domain);
                Self::from_domain(domain)
            }
            InternalError::Profile(ProfileError::RoleNotFound { role_id }) => {
                tracing::warn!("Caller role {} does not exist", role_id);
                Self::forbidden("Role is not allowed to access achievements")
            }
            InternalError::Credential(CredentialError::UserIdNotFound { user_id }) => {
                tracing::debug!("Caller {} no longer exists", user_id);
                Self::unauthorized()
            }
            InternalError::Credential(
                CredentialError::InvalidToken { .. } | CredentialError::ExpiredToken(_),
            ) => Self::unauthorized(),
            _ => {
                tracing::error!("Internal error in achievement operation: {}", err);
                AchievementApiError::InternalError(Json(ErrorEnvelope::new(INTERNAL_ERROR_MESSAGE)))
            }
        }
    }

    pub fn message(&self) -> String {
        match self {
            AchievementApiError::ValidationFailed(json)
            | AchievementApiError::Unauthorized(json)
            | AchievementApiError::Forbidden(json)
            | AchievementApiError::NotFound(json)
            | AchievementApiError::Conflict(json)
            | AchievementApiError::InternalError(json) => json.0.data.message.clone(),
        }
    }
}

impl fmt::Display for AchievementApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
