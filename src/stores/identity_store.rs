use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::{CredentialError, ProfileError};
use crate::types::db::{permission, role, role_permission, user};

/// Data for provisioning a user account
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role_id: String,
}

/// Users, roles and role-permission grants
pub struct IdentityStore {}

impl IdentityStore {
    pub fn new() -> Self {
        Self {}
    }

    /// Look up a user by username or email
    pub async fn find_user_by_identifier(
        &self,
        conn: &impl ConnectionTrait,
        identifier: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(identifier))
                    .add(user::Column::Email.eq(identifier)),
            )
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_identifier", e))
    }

    pub async fn get_user_by_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<user::Model, InternalError> {
        user::Entity::find_by_id(user_id.to_owned())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_user_by_id", e))?
            .ok_or_else(|| {
                InternalError::Credential(CredentialError::UserIdNotFound {
                    user_id: user_id.to_owned(),
                })
            })
    }

    pub async fn get_role_by_id(
        &self,
        conn: &impl ConnectionTrait,
        role_id: &str,
    ) -> Result<role::Model, InternalError> {
        role::Entity::find_by_id(role_id.to_owned())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_role_by_id", e))?
            .ok_or_else(|| {
                InternalError::Profile(ProfileError::RoleNotFound {
                    role_id: role_id.to_owned(),
                })
            })
    }

    pub async fn find_role_by_name(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
    ) -> Result<Option<role::Model>, InternalError> {
        role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_role_by_name", e))
    }

    /// Names of every permission granted to a role, sorted
    pub async fn permissions_for_role(
        &self,
        conn: &impl ConnectionTrait,
        role_id: &str,
    ) -> Result<Vec<String>, InternalError> {
        permission::Entity::find()
            .inner_join(role_permission::Entity)
            .filter(role_permission::Column::RoleId.eq(role_id))
            .select_only()
            .column(permission::Column::Name)
            .order_by_asc(permission::Column::Name)
            .into_tuple::<String>()
            .all(conn)
            .await
            .map_err(|e| InternalError::database("permissions_for_role", e))
    }

    /// Whether the role grants the named permission
    pub async fn role_has_permission(
        &self,
        conn: &impl ConnectionTrait,
        role_id: &str,
        permission_name: &str,
    ) -> Result<bool, InternalError> {
        let granted = permission::Entity::find()
            .inner_join(role_permission::Entity)
            .filter(role_permission::Column::RoleId.eq(role_id))
            .filter(permission::Column::Name.eq(permission_name))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("role_has_permission", e))?;

        Ok(granted > 0)
    }

    pub async fn create_user(
        &self,
        conn: &impl ConnectionTrait,
        new_user: NewUser,
    ) -> Result<user::Model, InternalError> {
        let existing = user::Entity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(&new_user.username))
                    .add(user::Column::Email.eq(&new_user.email)),
            )
            .count(conn)
            .await
            .map_err(|e| InternalError::database("check_duplicate_user", e))?;
        if existing > 0 {
            return Err(CredentialError::DuplicateUser(new_user.username).into());
        }

        let now = Utc::now().timestamp();
        user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            full_name: Set(new_user.full_name),
            role_id: Set(new_user.role_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_user", e))
    }

    /// Deactivate a user; accounts are never hard-deleted
    pub async fn deactivate_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<(), InternalError> {
        user::ActiveModel {
            id: Set(user_id.to_owned()),
            is_active: Set(false),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        }
        .update(conn)
        .await
        .map_err(|e| InternalError::database("deactivate_user", e))?;
        Ok(())
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{ROLE_ID_ADMIN, ROLE_ID_ADVISOR, ROLE_ID_STUDENT, setup_test_databases};

    fn new_user(username: &str, role_id: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.ac.id", username),
            password_hash: "hash".to_string(),
            full_name: username.to_uppercase(),
            role_id: role_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_seeded_grants() {
        let (ledger, _content) = setup_test_databases().await;
        let store = IdentityStore::new();

        let student = store.permissions_for_role(&ledger, ROLE_ID_STUDENT).await.unwrap();
        assert_eq!(
            student,
            vec![
                "achievement:create",
                "achievement:delete",
                "achievement:read",
                "achievement:update"
            ]
        );

        let advisor = store.permissions_for_role(&ledger, ROLE_ID_ADVISOR).await.unwrap();
        assert_eq!(advisor, vec!["achievement:read", "achievement:verify"]);

        let admin = store.permissions_for_role(&ledger, ROLE_ID_ADMIN).await.unwrap();
        assert_eq!(admin.len(), 6);
        assert!(admin.contains(&"user:manage".to_string()));
    }

    #[tokio::test]
    async fn test_role_has_permission() {
        let (ledger, _content) = setup_test_databases().await;
        let store = IdentityStore::new();

        assert!(store.role_has_permission(&ledger, ROLE_ID_ADVISOR, "achievement:verify").await.unwrap());
        assert!(!store.role_has_permission(&ledger, ROLE_ID_STUDENT, "achievement:verify").await.unwrap());
        assert!(!store.role_has_permission(&ledger, "no-such-role", "achievement:read").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_user_by_username_or_email() {
        let (ledger, _content) = setup_test_databases().await;
        let store = IdentityStore::new();
        let created = store.create_user(&ledger, new_user("budi", ROLE_ID_STUDENT)).await.unwrap();

        let by_name = store.find_user_by_identifier(&ledger, "budi").await.unwrap().unwrap();
        let by_email = store
            .find_user_by_identifier(&ledger, "budi@example.ac.id")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_email.id, created.id);
        assert!(store.find_user_by_identifier(&ledger, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_is_rejected() {
        let (ledger, _content) = setup_test_databases().await;
        let store = IdentityStore::new();
        store.create_user(&ledger, new_user("sari", ROLE_ID_STUDENT)).await.unwrap();

        let result = store.create_user(&ledger, new_user("sari", ROLE_ID_STUDENT)).await;
        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::DuplicateUser(_)))
        ));
    }

    #[tokio::test]
    async fn test_deactivate_user() {
        let (ledger, _content) = setup_test_databases().await;
        let store = IdentityStore::new();
        let created = store.create_user(&ledger, new_user("andi", ROLE_ID_STUDENT)).await.unwrap();

        store.deactivate_user(&ledger, &created.id).await.unwrap();
        let user = store.get_user_by_id(&ledger, &created.id).await.unwrap();
        assert!(!user.is_active);
    }

    #[tokio::test]
    async fn test_unknown_role_is_profile_error() {
        let (ledger, _content) = setup_test_databases().await;
        let result = IdentityStore::new().get_role_by_id(&ledger, "missing").await;
        assert!(matches!(
            result,
            Err(InternalError::Profile(ProfileError::RoleNotFound { .. }))
        ));
    }
}
