use std::fmt;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::prelude::*;
use uuid::Uuid;

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::providers::crypto_provider;
use crate::types::internal::auth::Claims;

/// JWT issuance/validation and refresh token helpers
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    jwt_expiration_minutes: i64,
    refresh_expiration_days: i64,
}

impl TokenProvider {
    pub fn new(secret_manager: Arc<SecretManager>) -> Self {
        Self {
            secret_manager,
            jwt_expiration_minutes: 15,
            refresh_expiration_days: 7,
        }
    }

    /// Lifetime of an access token in seconds
    pub fn jwt_lifetime_seconds(&self) -> i64 {
        self.jwt_expiration_minutes * 60
    }

    /// Generate an HS256 JWT for a user and their role
    ///
    /// # Returns
    /// Tuple of (encoded JWT, JWT ID)
    pub fn generate_jwt(&self, user_id: &str, role_id: &str) -> Result<(String, String), InternalError> {
        let now = Utc::now().timestamp();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id.to_owned(),
            role_id: role_id.to_owned(),
            exp: now + self.jwt_lifetime_seconds(),
            iat: now,
            jti: jti.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_generation", format!("Failed to generate JWT: {}", e)))?;

        tracing::debug!(user_id = %user_id, jti = %jti, "Issued access token");

        Ok((token, jti))
    }

    /// Validate a JWT and return the claims
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, InternalError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => CredentialError::ExpiredToken("jwt".to_string()).into(),
            _ => CredentialError::invalid_token("jwt", "invalid signature or malformed").into(),
        })
    }

    /// Generate an opaque refresh token: 32 random bytes, base64 encoded
    pub fn generate_refresh_token(&self) -> String {
        let mut rng = rand::rng();
        let random_bytes: [u8; 32] = rng.random();
        general_purpose::STANDARD.encode(random_bytes)
    }

    /// HMAC-SHA256 of a refresh token, the form in which it is persisted
    pub fn hash_refresh_token(&self, token: &str) -> Result<String, InternalError> {
        crypto_provider::hmac_sha256_token(self.secret_manager.refresh_token_secret(), token)
    }

    /// Expiry for a refresh token issued now
    pub fn get_refresh_expiration(&self) -> i64 {
        Utc::now().timestamp() + (self.refresh_expiration_days * 24 * 60 * 60)
    }
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("secret_manager", &"<redacted>")
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .field("refresh_expiration_days", &self.refresh_expiration_days)
            .finish()
    }
}

impl fmt::Display for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TokenProvider {{ jwt_expiration: {}min, refresh_expiration: {}days }}",
            self.jwt_expiration_minutes, self.refresh_expiration_days
        )
    }
}
