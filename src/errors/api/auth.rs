use crate::errors::internal::{CredentialError, InternalError};
use poem_openapi::{ApiResponse, payload::Json};
use std::fmt;

use super::{ErrorEnvelope, INTERNAL_ERROR_MESSAGE};

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Invalid identifier or password
    #[oai(status = 401)]
    InvalidCredentials(Json<ErrorEnvelope>),

    /// Invalid or malformed JWT
    #[oai(status = 401)]
    InvalidToken(Json<ErrorEnvelope>),

    /// JWT has expired
    #[oai(status = 401)]
    ExpiredToken(Json<ErrorEnvelope>),

    /// Authorization header is missing
    #[oai(status = 401)]
    MissingAuthHeader(Json<ErrorEnvelope>),

    /// Invalid refresh token
    #[oai(status = 401)]
    InvalidRefreshToken(Json<ErrorEnvelope>),

    /// Refresh token has expired
    #[oai(status = 401)]
    ExpiredRefreshToken(Json<ErrorEnvelope>),

    /// Request body failed validation
    #[oai(status = 400)]
    BadRequest(Json<ErrorEnvelope>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorEnvelope>),
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Json(ErrorEnvelope::new("Invalid username or password")))
    }

    pub fn invalid_token() -> Self {
        AuthError::InvalidToken(Json(ErrorEnvelope::new("Invalid or malformed JWT")))
    }

    pub fn expired_token() -> Self {
        AuthError::ExpiredToken(Json(ErrorEnvelope::new("JWT has expired")))
    }

    pub fn missing_auth_header() -> Self {
        AuthError::MissingAuthHeader(Json(ErrorEnvelope::new(
            "Authorization header is required",
        )))
    }

    pub fn invalid_refresh_token() -> Self {
        AuthError::InvalidRefreshToken(Json(ErrorEnvelope::new("Invalid refresh token")))
    }

    pub fn expired_refresh_token() -> Self {
        AuthError::ExpiredRefreshToken(Json(ErrorEnvelope::new("Refresh token has expired")))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AuthError::BadRequest(Json(ErrorEnvelope::new(message)))
    }

    /// Convert InternalError to AuthError
    ///
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Database(_) => {
                tracing::error!("Database error in auth operation: {}", err);
                Self::internal_server_error()
            }
            InternalError::Parse { value_type, .. } => {
                tracing::error!("Parse error for {}: {}", value_type, err);
                Self::internal_server_error()
            }
            InternalError::Crypto { operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }

            InternalError::Credential(CredentialError::InvalidCredentials) => {
                tracing::debug!("Invalid credentials attempt");
                Self::invalid_credentials()
            }
            InternalError::Credential(CredentialError::UserIdNotFound { user_id }) => {
                // Token for a user that no longer exists
                tracing::debug!("Token subject {} not found", user_id);
                Self::invalid_token()
            }
            InternalError::Credential(CredentialError::InvalidToken { token_type, reason }) => {
                tracing::debug!("Invalid token: {} - {}", token_type, reason);
                if token_type == "refresh_token" {
                    Self::invalid_refresh_token()
                } else {
                    Self::invalid_token()
                }
            }
            InternalError::Credential(CredentialError::ExpiredToken(token_type)) => {
                tracing::debug!("Expired token: {}", token_type);
                if token_type == "refresh_token" {
                    Self::expired_refresh_token()
                } else {
                    Self::expired_token()
                }
            }

            _ => {
                tracing::error!("Unexpected error in auth operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    fn internal_server_error() -> Self {
        AuthError::InternalError(Json(ErrorEnvelope::new(INTERNAL_ERROR_MESSAGE)))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AuthError::InvalidCredentials(json)
            | AuthError::InvalidToken(json)
            | AuthError::ExpiredToken(json)
            | AuthError::MissingAuthHeader(json)
            | AuthError::InvalidRefreshToken(json)
            | AuthError::ExpiredRefreshToken(json)
            | AuthError::BadRequest(json)
            | AuthError::InternalError(json) => json.0.data.message.clone(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
