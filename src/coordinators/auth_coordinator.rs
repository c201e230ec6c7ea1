use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::providers::{CryptoProvider, TokenProvider};
use crate::stores::{CredentialStore, IdentityStore};
use crate::types::db::{role, user};
use crate::types::internal::RequestContext;
use crate::types::internal::auth::IssuedTokens;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub tokens: IssuedTokens,
    pub user: user::Model,
    pub role: role::Model,
    /// Sorted permission names of the user's role
    pub permissions: Vec<String>,
}

/// Orchestrates login, token refresh, logout and profile lookup
pub struct AuthCoordinator {
    ledger: DatabaseConnection,
    identity_store: Arc<IdentityStore>,
    credential_store: Arc<CredentialStore>,
    token_provider: Arc<TokenProvider>,
    crypto_provider: Arc<CryptoProvider>,
}

impl AuthCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            ledger: app_data.connections.ledger.clone(),
            identity_store: app_data.identity_store.clone(),
            credential_store: app_data.credential_store.clone(),
            token_provider: app_data.token_provider.clone(),
            crypto_provider: Arc::new(CryptoProvider::new(app_data.secret_manager.clone())),
        }
    }

    /// Authenticate by username or email and issue an access/refresh token pair
    ///
    /// Unknown identifiers, wrong passwords and deactivated accounts all fail
    /// with the same InvalidCredentials.
    pub async fn login(
        &self,
        ctx: &RequestContext,
        identifier: &str,
        password: &str,
    ) -> Result<LoginResult, InternalError> {
        let user = match self
            .identity_store
            .find_user_by_identifier(&self.ledger, identifier.trim())
            .await?
        {
            Some(user) => user,
            None => {
                tracing::debug!(request_id = %ctx.request_id, "Login for unknown identifier");
                return Err(CredentialError::InvalidCredentials.into());
            }
        };

        if !self
            .crypto_provider
            .verify_password(&user.password_hash, password)
            .await?
        {
            tracing::debug!(user_id = %user.id, request_id = %ctx.request_id, "Login with wrong password");
            return Err(CredentialError::InvalidCredentials.into());
        }
        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login refused for deactivated account");
            return Err(CredentialError::InvalidCredentials.into());
        }

        let role = self.identity_store.get_role_by_id(&self.ledger, &user.role_id).await?;
        let permissions = self
            .identity_store
            .permissions_for_role(&self.ledger, &user.role_id)
            .await?;

        let (access_token, _jti) = self.token_provider.generate_jwt(&user.id, &user.role_id)?;
        let refresh_token = self.token_provider.generate_refresh_token();
        let token_hash = self.token_provider.hash_refresh_token(&refresh_token)?;

        self.credential_store
            .save_refresh_token_for_user(
                &self.ledger,
                &user.id,
                &token_hash,
                Utc::now().timestamp(),
                self.token_provider.get_refresh_expiration(),
            )
            .await?;

        tracing::info!(
            user_id = %user.id,
            ip = ?ctx.ip_address,
            request_id = %ctx.request_id,
            "User logged in"
        );

        Ok(LoginResult {
            tokens: IssuedTokens {
                access_token,
                refresh_token,
                expires_in: self.token_provider.jwt_lifetime_seconds(),
            },
            user,
            role,
            permissions,
        })
    }

    /// Exchange a valid refresh token for a new access token
    ///
    /// # Returns
    /// Tuple of (access token, lifetime in seconds)
    pub async fn refresh(&self, ctx: &RequestContext, refresh_token: &str) -> Result<(String, i64), InternalError> {
        let token_hash = self.token_provider.hash_refresh_token(refresh_token)?;
        let user_id = self
            .credential_store
            .validate_refresh_token(&self.ledger, &token_hash)
            .await?;

        let user = self.identity_store.get_user_by_id(&self.ledger, &user_id).await?;
        if !user.is_active {
            return Err(CredentialError::invalid_token("refresh_token", "account is deactivated").into());
        }

        let (access_token, _jti) = self.token_provider.generate_jwt(&user.id, &user.role_id)?;

        tracing::debug!(user_id = %user.id, request_id = %ctx.request_id, "Access token refreshed");

        Ok((access_token, self.token_provider.jwt_lifetime_seconds()))
    }

    /// Revoke a refresh token
    ///
    /// Best effort: failures are logged and never reach the caller.
    pub async fn logout(&self, ctx: &RequestContext, refresh_token: &str) {
        let token_hash = match self.token_provider.hash_refresh_token(refresh_token) {
            Ok(hash) => hash,
            Err(err) => {
                tracing::warn!(request_id = %ctx.request_id, error = %err, "Could not hash refresh token on logout");
                return;
            }
        };

        match self.credential_store.revoke_refresh_token(&self.ledger, &token_hash).await {
            Ok(true) => tracing::info!(actor = %ctx.actor_id, request_id = %ctx.request_id, "Refresh token revoked"),
            Ok(false) => tracing::debug!(request_id = %ctx.request_id, "Logout with unknown refresh token"),
            Err(err) => {
                tracing::warn!(request_id = %ctx.request_id, error = %err, "Failed to revoke refresh token")
            }
        }
    }

    /// The authenticated caller's account
    pub async fn profile(&self, ctx: &RequestContext) -> Result<user::Model, InternalError> {
        let claims = ctx.require_claims()?;
        self.identity_store.get_user_by_id(&self.ledger, &claims.sub).await
    }

    /// Remove expired refresh tokens
    pub async fn purge_expired_tokens(&self) -> Result<u64, InternalError> {
        let purged = self.credential_store.purge_expired(&self.ledger).await?;
        if purged > 0 {
            tracing::info!(purged, "Expired refresh tokens removed");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{ROLE_ID_STUDENT, create_test_user_with_password, setup_test_app_data};

    async fn setup() -> (Arc<AppData>, AuthCoordinator, user::Model) {
        let app_data = setup_test_app_data().await;
        let user =
            create_test_user_with_password(&app_data.connections.ledger, "mahasiswa1", ROLE_ID_STUDENT, "rahasia123")
                .await;
        let coordinator = AuthCoordinator::new(app_data.clone());
        (app_data, coordinator, user)
    }

    #[tokio::test]
    async fn test_login_by_username_or_email() {
        let (_app_data, coordinator, user) = setup().await;
        let ctx = RequestContext::for_api();

        let result = coordinator.login(&ctx, "mahasiswa1", "rahasia123").await.unwrap();
        assert_eq!(result.user.id, user.id);
        assert_eq!(result.role.name, "Mahasiswa");
        assert_eq!(
            result.permissions,
            vec![
                "achievement:create",
                "achievement:delete",
                "achievement:read",
                "achievement:update"
            ]
        );
        assert_eq!(result.tokens.expires_in, 900);

        let by_email = coordinator
            .login(&ctx, "mahasiswa1@example.ac.id", "rahasia123")
            .await
            .unwrap();
        assert_eq!(by_email.user.id, user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (app_data, coordinator, user) = setup().await;
        let ctx = RequestContext::for_api();

        let wrong_password = coordinator.login(&ctx, "mahasiswa1", "salah").await;
        assert!(matches!(
            wrong_password,
            Err(InternalError::Credential(CredentialError::InvalidCredentials))
        ));

        let unknown = coordinator.login(&ctx, "nobody", "rahasia123").await;
        assert!(matches!(
            unknown,
            Err(InternalError::Credential(CredentialError::InvalidCredentials))
        ));

        app_data
            .identity_store
            .deactivate_user(&app_data.connections.ledger, &user.id)
            .await
            .unwrap();
        let inactive = coordinator.login(&ctx, "mahasiswa1", "rahasia123").await;
        assert!(matches!(
            inactive,
            Err(InternalError::Credential(CredentialError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_refresh_then_logout_revokes() {
        let (app_data, coordinator, user) = setup().await;
        let ctx = RequestContext::for_api();
        let login = coordinator.login(&ctx, "mahasiswa1", "rahasia123").await.unwrap();

        let (access_token, expires_in) = coordinator.refresh(&ctx, &login.tokens.refresh_token).await.unwrap();
        assert_eq!(expires_in, 900);
        let claims = app_data.token_provider.validate_jwt(&access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role_id, ROLE_ID_STUDENT);

        coordinator.logout(&ctx, &login.tokens.refresh_token).await;

        let result = coordinator.refresh(&ctx, &login.tokens.refresh_token).await;
        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::InvalidToken { .. }))
        ));

        // Logging out twice is harmless
        coordinator.logout(&ctx, &login.tokens.refresh_token).await;
    }

    #[tokio::test]
    async fn test_profile_requires_claims() {
        let (app_data, coordinator, user) = setup().await;

        let anonymous = coordinator.profile(&RequestContext::for_api()).await;
        assert!(matches!(anonymous, Err(InternalError::Achievement(_))));

        let login = coordinator
            .login(&RequestContext::for_api(), "mahasiswa1", "rahasia123")
            .await
            .unwrap();
        let claims = app_data.token_provider.validate_jwt(&login.tokens.access_token).unwrap();
        let ctx = RequestContext::for_api().with_auth(claims);

        let profile = coordinator.profile(&ctx).await.unwrap();
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.email, "mahasiswa1@example.ac.id");
    }
}
