use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::errors::{AchievementError, InternalError};
use crate::stores::IdentityStore;
use crate::types::internal::RequestContext;

pub const PERM_ACHIEVEMENT_CREATE: &str = "achievement:create";
pub const PERM_ACHIEVEMENT_READ: &str = "achievement:read";
pub const PERM_ACHIEVEMENT_UPDATE: &str = "achievement:update";
pub const PERM_ACHIEVEMENT_DELETE: &str = "achievement:delete";
pub const PERM_ACHIEVEMENT_VERIFY: &str = "achievement:verify";
pub const PERM_USER_MANAGE: &str = "user:manage";

/// Coarse resource:action gate checked before a route reaches a coordinator
pub struct PermissionProvider {
    identity_store: Arc<IdentityStore>,
}

impl PermissionProvider {
    pub fn new(identity_store: Arc<IdentityStore>) -> Self {
        Self { identity_store }
    }

    /// Whether the user's current role grants the permission
    ///
    /// The role is read from the user row, not from the token, so a role change
    /// applies without waiting for the token to expire.
    pub async fn has_permission(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        permission_name: &str,
    ) -> Result<bool, InternalError> {
        let user = self.identity_store.get_user_by_id(conn, user_id).await?;
        if !user.is_active {
            return Ok(false);
        }

        self.identity_store
            .role_has_permission(conn, &user.role_id, permission_name)
            .await
    }

    /// Require an authenticated caller holding the permission
    pub async fn require(
        &self,
        conn: &impl ConnectionTrait,
        ctx: &RequestContext,
        permission_name: &str,
    ) -> Result<(), InternalError> {
        let claims = ctx.require_claims()?;

        if self.has_permission(conn, &claims.sub, permission_name).await? {
            Ok(())
        } else {
            tracing::debug!(
                user_id = %claims.sub,
                permission = permission_name,
                "Permission denied"
            );
            Err(AchievementError::forbidden(format!("Missing permission: {}", permission_name)).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{ROLE_ID_ADMIN, ROLE_ID_ADVISOR, ROLE_ID_STUDENT, authenticated_context, create_test_user, setup_test_databases};

    #[tokio::test]
    async fn test_role_grants_follow_seed_data() {
        let (ledger, _content) = setup_test_databases().await;
        let provider = PermissionProvider::new(Arc::new(IdentityStore::new()));
        let student = create_test_user(&ledger, "mhs", ROLE_ID_STUDENT).await;
        let advisor = create_test_user(&ledger, "dsn", ROLE_ID_ADVISOR).await;
        let admin = create_test_user(&ledger, "adm", ROLE_ID_ADMIN).await;

        assert!(provider.has_permission(&ledger, &student.id, PERM_ACHIEVEMENT_CREATE).await.unwrap());
        assert!(!provider.has_permission(&ledger, &student.id, PERM_ACHIEVEMENT_VERIFY).await.unwrap());
        assert!(provider.has_permission(&ledger, &advisor.id, PERM_ACHIEVEMENT_VERIFY).await.unwrap());
        assert!(!provider.has_permission(&ledger, &advisor.id, PERM_ACHIEVEMENT_CREATE).await.unwrap());
        assert!(provider.has_permission(&ledger, &admin.id, PERM_USER_MANAGE).await.unwrap());
    }

    #[tokio::test]
    async fn test_inactive_user_has_no_permissions() {
        let (ledger, _content) = setup_test_databases().await;
        let identity = Arc::new(IdentityStore::new());
        let provider = PermissionProvider::new(identity.clone());
        let admin = create_test_user(&ledger, "adm", ROLE_ID_ADMIN).await;
        identity.deactivate_user(&ledger, &admin.id).await.unwrap();

        assert!(!provider.has_permission(&ledger, &admin.id, PERM_ACHIEVEMENT_READ).await.unwrap());
    }

    #[tokio::test]
    async fn test_require_distinguishes_anonymous_and_forbidden() {
        let (ledger, _content) = setup_test_databases().await;
        let provider = PermissionProvider::new(Arc::new(IdentityStore::new()));
        let advisor = create_test_user(&ledger, "dsn", ROLE_ID_ADVISOR).await;

        let anonymous = RequestContext::for_api();
        assert!(matches!(
            provider.require(&ledger, &anonymous, PERM_ACHIEVEMENT_READ).await,
            Err(InternalError::Achievement(AchievementError::Unauthorized(_)))
        ));

        let ctx = authenticated_context(&advisor.id, ROLE_ID_ADVISOR);
        assert!(provider.require(&ledger, &ctx, PERM_ACHIEVEMENT_READ).await.is_ok());
        assert!(matches!(
            provider.require(&ledger, &ctx, PERM_ACHIEVEMENT_DELETE).await,
            Err(InternalError::Achievement(AchievementError::Forbidden(_)))
        ));
    }
}
