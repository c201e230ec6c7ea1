use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::types::db::refresh_token;

/// Persisted refresh tokens, keyed by their HMAC
pub struct CredentialStore {}

impl CredentialStore {
    pub fn new() -> Self {
        Self {}
    }

    pub async fn save_refresh_token_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        token_hash: &str,
        created_at: i64,
        expires_at: i64,
    ) -> Result<(), InternalError> {
        refresh_token::ActiveModel {
            token_hash: Set(token_hash.to_owned()),
            user_id: Set(user_id.to_owned()),
            expires_at: Set(expires_at),
            created_at: Set(created_at),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("insert_refresh_token", e))?;

        Ok(())
    }

    /// Validate a refresh token hash and return the associated user_id
    pub async fn validate_refresh_token(
        &self,
        conn: &impl ConnectionTrait,
        token_hash: &str,
    ) -> Result<String, InternalError> {
        let token = refresh_token::Entity::find_by_id(token_hash.to_owned())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_refresh_token", e))?
            .ok_or_else(|| CredentialError::invalid_token("refresh_token", "not found"))?;

        if token.expires_at < Utc::now().timestamp() {
            return Err(CredentialError::ExpiredToken("refresh_token".to_string()).into());
        }

        Ok(token.user_id)
    }

    /// Delete a refresh token; returns false if it was not stored
    pub async fn revoke_refresh_token(
        &self,
        conn: &impl ConnectionTrait,
        token_hash: &str,
    ) -> Result<bool, InternalError> {
        let result = refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("revoke_refresh_token", e))?;

        Ok(result.rows_affected > 0)
    }

    /// Drop tokens whose expiry has passed
    pub async fn purge_expired(&self, conn: &impl ConnectionTrait) -> Result<u64, InternalError> {
        let result = refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::ExpiresAt.lt(Utc::now().timestamp()))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("purge_expired_refresh_tokens", e))?;

        Ok(result.rows_affected)
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}
