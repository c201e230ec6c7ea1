use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 of a token and return it as lowercase hex
pub fn hmac_sha256_token(key: &str, token: &str) -> Result<String, InternalError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| InternalError::crypto("hmac_init", e.to_string()))?;
    mac.update(token.as_bytes());
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// Password hashing with Argon2id peppered by the server secret
///
/// Hashing runs on the blocking pool; Argon2 is deliberately slow.
pub struct CryptoProvider {
    secret_manager: Arc<SecretManager>,
}

impl CryptoProvider {
    pub fn new(secret_manager: Arc<SecretManager>) -> Self {
        Self { secret_manager }
    }

    /// Hash a password into a PHC string
    pub async fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let pepper = self.secret_manager.pepper().to_owned();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || -> Result<_, InternalError> {
            let argon2 = peppered_argon2(&pepper)?;
            let salt = SaltString::generate(&mut rand_core::OsRng);

            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| CredentialError::PasswordHashingFailed(e.to_string()).into())
        })
        .await
        .map_err(|e| InternalError::crypto("hash_password", e.to_string()))?
    }

    /// Check a password against a stored PHC string
    ///
    /// A malformed stored hash counts as a mismatch, not an error.
    pub async fn verify_password(&self, password_hash: &str, password: &str) -> Result<bool, InternalError> {
        let pepper = self.secret_manager.pepper().to_owned();
        let password_hash = password_hash.to_owned();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || -> Result<_, InternalError> {
            let argon2 = peppered_argon2(&pepper)?;
            let parsed = match PasswordHash::new(&password_hash) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Stored password hash is malformed: {}", e);
                    return Ok(false);
                }
            };

            Ok(argon2.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await
        .map_err(|e| InternalError::crypto("verify_password", e.to_string()))?
    }
}

fn peppered_argon2(pepper: &str) -> Result<Argon2<'_>, InternalError> {
    Argon2::new_with_secret(pepper.as_bytes(), Algorithm::Argon2id, Version::V0x13, Params::default())
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
}
