use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::errors::internal::CredentialError;
use crate::errors::{AchievementError, InternalError};
use crate::stores::{IdentityStore, ProfileStore};
use crate::types::db::{lecturer, student};
use crate::types::internal::auth::Claims;
use crate::types::internal::{Principal, RoleKind};

/// Translates a caller into a principal and their student/lecturer profile
pub struct ProfileProvider {
    identity_store: Arc<IdentityStore>,
    profile_store: Arc<ProfileStore>,
}

impl ProfileProvider {
    pub fn new(identity_store: Arc<IdentityStore>, profile_store: Arc<ProfileStore>) -> Self {
        Self {
            identity_store,
            profile_store,
        }
    }

    /// Resolve validated claims into a principal with its role kind
    ///
    /// The role comes from the user row, not from the token, so a role change
    /// applies to scoping the same way it applies to the permission gate. A
    /// subject that no longer exists or was deactivated is Unauthorized.
    pub async fn resolve_principal(
        &self,
        conn: &impl ConnectionTrait,
        claims: &Claims,
    ) -> Result<Principal, InternalError> {
        let user = match self.identity_store.get_user_by_id(conn, &claims.sub).await {
            Ok(user) => user,
            Err(InternalError::Credential(CredentialError::UserIdNotFound { .. })) => {
                return Err(AchievementError::unauthorized().into());
            }
            Err(e) => return Err(e),
        };
        if !user.is_active {
            return Err(AchievementError::unauthorized().into());
        }
        if user.role_id != claims.role_id {
            tracing::debug!(
                user_id = %user.id,
                token_role = %claims.role_id,
                current_role = %user.role_id,
                "Role changed since token issuance"
            );
        }

        let role = self.identity_store.get_role_by_id(conn, &user.role_id).await?;
        let kind = RoleKind::from_role_name(&role.name);

        Ok(Principal {
            user_id: user.id,
            role_id: role.id,
            role_name: role.name,
            kind,
        })
    }

    /// The caller's student profile; NotFound when none is provisioned
    pub async fn student_for(
        &self,
        conn: &impl ConnectionTrait,
        principal: &Principal,
    ) -> Result<student::Model, InternalError> {
        self.profile_store
            .find_student_by_user_id(conn, &principal.user_id)
            .await?
            .ok_or_else(|| AchievementError::student_not_provisioned().into())
    }

    /// The caller's lecturer profile; NotFound when none is provisioned
    pub async fn lecturer_for(
        &self,
        conn: &impl ConnectionTrait,
        principal: &Principal,
    ) -> Result<lecturer::Model, InternalError> {
        self.profile_store
            .find_lecturer_by_user_id(conn, &principal.user_id)
            .await?
            .ok_or_else(|| AchievementError::lecturer_not_provisioned().into())
    }

    pub async fn student_by_id(
        &self,
        conn: &impl ConnectionTrait,
        student_id: &str,
    ) -> Result<Option<student::Model>, InternalError> {
        self.profile_store.find_student_by_id(conn, student_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{
        ROLE_ID_ADMIN, ROLE_ID_ADVISOR, ROLE_ID_STUDENT, create_test_lecturer, create_test_student, create_test_user,
        setup_test_databases,
    };

    fn provider() -> ProfileProvider {
        ProfileProvider::new(Arc::new(IdentityStore::new()), Arc::new(ProfileStore::new()))
    }

    fn claims(user_id: &str, role_id: &str) -> Claims {
        Claims {
            sub: user_id.to_string(),
            role_id: role_id.to_string(),
            exp: 0,
            iat: 0,
            jti: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_principal_maps_role_kind() {
        let (ledger, _content) = setup_test_databases().await;
        let (user, _student) = create_test_student(&ledger, "mhs", None).await;

        let principal = provider()
            .resolve_principal(&ledger, &claims(&user.id, ROLE_ID_STUDENT))
            .await
            .unwrap();

        assert_eq!(principal.kind, RoleKind::Student);
        assert_eq!(principal.role_name, "Mahasiswa");
        assert_eq!(principal.user_id, user.id);
    }

    #[tokio::test]
    async fn test_resolve_principal_unknown_user_is_unauthorized() {
        let (ledger, _content) = setup_test_databases().await;

        let result = provider().resolve_principal(&ledger, &claims("u", ROLE_ID_STUDENT)).await;

        assert!(matches!(
            result,
            Err(InternalError::Achievement(AchievementError::Unauthorized(_)))
        ));
    }

    #[tokio::test]
    async fn test_resolve_principal_uses_current_role_over_token() {
        let (ledger, _content) = setup_test_databases().await;
        let user = create_test_user(&ledger, "pindah", ROLE_ID_STUDENT).await;

        let principal = provider()
            .resolve_principal(&ledger, &claims(&user.id, ROLE_ID_ADMIN))
            .await
            .unwrap();

        assert_eq!(principal.kind, RoleKind::Student);
        assert_eq!(principal.role_id, ROLE_ID_STUDENT);
    }

    #[tokio::test]
    async fn test_resolve_principal_refuses_inactive_user() {
        let (ledger, _content) = setup_test_databases().await;
        let user = create_test_user(&ledger, "nonaktif", ROLE_ID_STUDENT).await;
        IdentityStore::new().deactivate_user(&ledger, &user.id).await.unwrap();

        let result = provider().resolve_principal(&ledger, &claims(&user.id, ROLE_ID_STUDENT)).await;

        assert!(matches!(
            result,
            Err(InternalError::Achievement(AchievementError::Unauthorized(_)))
        ));
    }

    #[tokio::test]
    async fn test_student_for_without_profile_is_not_found() {
        let (ledger, _content) = setup_test_databases().await;
        let user = create_test_user(&ledger, "bare", ROLE_ID_STUDENT).await;
        let provider = provider();
        let principal = provider
            .resolve_principal(&ledger, &claims(&user.id, ROLE_ID_STUDENT))
            .await
            .unwrap();

        let result = provider.student_for(&ledger, &principal).await;

        assert!(matches!(
            result,
            Err(InternalError::Achievement(AchievementError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_lecturer_for_returns_profile() {
        let (ledger, _content) = setup_test_databases().await;
        let (user, lecturer) = create_test_lecturer(&ledger, "dosen").await;
        let provider = provider();
        let principal = provider
            .resolve_principal(&ledger, &claims(&user.id, ROLE_ID_ADVISOR))
            .await
            .unwrap();

        let found = provider.lecturer_for(&ledger, &principal).await.unwrap();
        assert_eq!(found.id, lecturer.id);
    }
}
