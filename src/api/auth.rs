use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, payload::Json};

use crate::api::ApiTags;
use crate::app_data::AppData;
use crate::coordinators::{AuthCoordinator, LoginResult};
use crate::errors::AuthError;
use crate::providers::TokenProvider;
use crate::types::dto::auth::{
    LoginEnvelope, LoginRequest, LoginResponse, LoginUser, ProfileEnvelope, ProfileResponse,
    RefreshEnvelope, RefreshRequest, RefreshResponse,
};
use crate::types::dto::common::{MessageEnvelope, STATUS_SUCCESS};
use crate::types::internal::RequestContext;

const TOKEN_TYPE: &str = "Bearer";

/// Authentication API endpoints
pub struct AuthApi {
    auth_coordinator: AuthCoordinator,
    token_provider: Arc<TokenProvider>,
}

impl AuthApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            token_provider: app_data.token_provider.clone(),
            auth_coordinator: AuthCoordinator::new(app_data),
        }
    }
}

impl From<LoginResult> for LoginResponse {
    fn from(result: LoginResult) -> Self {
        LoginResponse {
            token: result.tokens.access_token,
            refresh_token: result.tokens.refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: result.tokens.expires_in,
            user: LoginUser {
                id: result.user.id,
                username: result.user.username,
                full_name: result.user.full_name,
                role: result.role.name,
                permissions: result.permissions,
            },
        }
    }
}

#[OpenApi(prefix_path = "/v1/auth")]
impl AuthApi {
    /// Authenticate with username or email and password
    ///
    /// Returns an access token (JWT, 15 minutes) and a refresh token (7 days).
    #[oai(path = "/login", method = "post", tag = "ApiTags::Authentication")]
    async fn login(&self, req: &Request, body: Json<LoginRequest>) -> Result<Json<LoginEnvelope>, AuthError> {
        let ctx = RequestContext::validate_request(req, &self.token_provider);

        if body.username.trim().is_empty() || body.password.is_empty() {
            return Err(AuthError::bad_request("Username and password are required"));
        }

        let result = self
            .auth_coordinator
            .login(&ctx, &body.username, &body.password)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(LoginEnvelope {
            status: STATUS_SUCCESS.to_string(),
            data: result.into(),
        }))
    }

    /// Obtain a new access token with a refresh token
    #[oai(path = "/refresh", method = "post", tag = "ApiTags::Authentication")]
    async fn refresh(&self, req: &Request, body: Json<RefreshRequest>) -> Result<Json<RefreshEnvelope>, AuthError> {
        let ctx = RequestContext::validate_request(req, &self.token_provider);

        if body.refresh_token.is_empty() {
            return Err(AuthError::bad_request("Refresh token is required"));
        }

        let (token, expires_in) = self
            .auth_coordinator
            .refresh(&ctx, &body.refresh_token)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(RefreshEnvelope {
            status: STATUS_SUCCESS.to_string(),
            data: RefreshResponse {
                token,
                token_type: TOKEN_TYPE.to_string(),
                expires_in,
            },
        }))
    }

    /// Revoke a refresh token
    ///
    /// Always succeeds once the request is well formed.
    #[oai(path = "/logout", method = "post", tag = "ApiTags::Authentication")]
    async fn logout(&self, req: &Request, body: Json<RefreshRequest>) -> Result<Json<MessageEnvelope>, AuthError> {
        let ctx = RequestContext::validate_request(req, &self.token_provider);

        if body.refresh_token.is_empty() {
            return Err(AuthError::bad_request("Refresh token is required"));
        }

        self.auth_coordinator.logout(&ctx, &body.refresh_token).await;

        Ok(Json(MessageEnvelope::new("Logged out successfully")))
    }

    /// Profile of the authenticated caller
    #[oai(path = "/profile", method = "get", tag = "ApiTags::Authentication")]
    async fn profile(&self, req: &Request) -> Result<Json<ProfileEnvelope>, AuthError> {
        let ctx = RequestContext::validate_request(req, &self.token_provider);

        if !ctx.authenticated {
            return Err(match req.header("Authorization") {
                Some(_) => AuthError::invalid_token(),
                None => AuthError::missing_auth_header(),
            });
        }

        let user = self
            .auth_coordinator
            .profile(&ctx)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(ProfileEnvelope {
            status: STATUS_SUCCESS.to_string(),
            data: ProfileResponse {
                user_id: user.id,
                username: user.username,
                email: user.email,
                full_name: user.full_name,
                role_id: user.role_id,
            },
        }))
    }
}
