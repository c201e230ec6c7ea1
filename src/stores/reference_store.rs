use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::{AchievementStatus, achievement_reference, student};

/// Fields stamped alongside a status change
#[derive(Debug, Default, Clone)]
pub struct TransitionStamp {
    pub submitted_at: Option<i64>,
    pub verified_at: Option<i64>,
    pub verified_by: Option<String>,
    pub rejection_note: Option<String>,
}

/// Achievement reference ledger: the authoritative lifecycle record
///
/// Every lookup except `find_by_content_id_any_status` ignores references in
/// the terminal `deleted` state.
pub struct ReferenceStore {}

impl ReferenceStore {
    pub fn new() -> Self {
        Self {}
    }

    /// Insert a `draft` reference pointing at a content document
    pub async fn create_draft(
        &self,
        conn: &impl ConnectionTrait,
        student_id: &str,
        content_id: &str,
    ) -> Result<achievement_reference::Model, InternalError> {
        let now = Utc::now().timestamp();
        achievement_reference::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            student_id: Set(student_id.to_owned()),
            content_id: Set(content_id.to_owned()),
            status: Set(AchievementStatus::Draft),
            submitted_at: Set(None),
            verified_at: Set(None),
            verified_by: Set(None),
            rejection_note: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_reference", e))
    }

    pub async fn find_by_content_id(
        &self,
        conn: &impl ConnectionTrait,
        content_id: &str,
    ) -> Result<Option<achievement_reference::Model>, InternalError> {
        achievement_reference::Entity::find()
            .filter(achievement_reference::Column::ContentId.eq(content_id))
            .filter(achievement_reference::Column::Status.ne(AchievementStatus::Deleted))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_reference_by_content_id", e))
    }

    pub async fn find_by_content_id_any_status(
        &self,
        conn: &impl ConnectionTrait,
        content_id: &str,
    ) -> Result<Option<achievement_reference::Model>, InternalError> {
        achievement_reference::Entity::find()
            .filter(achievement_reference::Column::ContentId.eq(content_id))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_reference_by_content_id_any_status", e))
    }

    /// References owned by one student, newest first
    pub async fn list_for_student(
        &self,
        conn: &impl ConnectionTrait,
        student_id: &str,
    ) -> Result<Vec<achievement_reference::Model>, InternalError> {
        achievement_reference::Entity::find()
            .filter(achievement_reference::Column::StudentId.eq(student_id))
            .filter(achievement_reference::Column::Status.ne(AchievementStatus::Deleted))
            .order_by_desc(achievement_reference::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_references_for_student", e))
    }

    /// References of every student advised by `lecturer_id`, newest first
    pub async fn list_for_advisor(
        &self,
        conn: &impl ConnectionTrait,
        lecturer_id: &str,
    ) -> Result<Vec<achievement_reference::Model>, InternalError> {
        achievement_reference::Entity::find()
            .inner_join(student::Entity)
            .filter(student::Column::AdvisorId.eq(lecturer_id))
            .filter(achievement_reference::Column::Status.ne(AchievementStatus::Deleted))
            .order_by_desc(achievement_reference::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_references_for_advisor", e))
    }

    pub async fn list_all(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<achievement_reference::Model>, InternalError> {
        achievement_reference::Entity::find()
            .filter(achievement_reference::Column::Status.ne(AchievementStatus::Deleted))
            .order_by_desc(achievement_reference::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_all_references", e))
    }

    /// Content ids that still have a live reference
    pub async fn active_content_ids(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<String>, InternalError> {
        achievement_reference::Entity::find()
            .filter(achievement_reference::Column::Status.ne(AchievementStatus::Deleted))
            .select_only()
            .column(achievement_reference::Column::ContentId)
            .into_tuple::<String>()
            .all(conn)
            .await
            .map_err(|e| InternalError::database("active_content_ids", e))
    }

    /// Atomically move a reference from `from` to `to`
    ///
    /// The status guard is part of the UPDATE, so concurrent callers cannot
    /// both succeed. Returns false when no row was in the expected state.
    pub async fn transition(
        &self,
        conn: &impl ConnectionTrait,
        content_id: &str,
        from: AchievementStatus,
        to: AchievementStatus,
        stamp: TransitionStamp,
    ) -> Result<bool, InternalError> {
        let mut changes = achievement_reference::ActiveModel {
            status: Set(to),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(submitted_at) = stamp.submitted_at {
            changes.submitted_at = Set(Some(submitted_at));
        }
        if let Some(verified_at) = stamp.verified_at {
            changes.verified_at = Set(Some(verified_at));
        }
        if let Some(verified_by) = stamp.verified_by {
            changes.verified_by = Set(Some(verified_by));
        }
        if let Some(note) = stamp.rejection_note {
            changes.rejection_note = Set(Some(note));
        }

        let result = achievement_reference::Entity::update_many()
            .set(changes)
            .filter(achievement_reference::Column::ContentId.eq(content_id))
            .filter(achievement_reference::Column::Status.eq(from))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("transition_reference", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Bump `updated_at` of a reference that is still a draft
    ///
    /// Used as the guard for content edits; false means the reference left
    /// `draft` since it was read.
    pub async fn touch_draft(
        &self,
        conn: &impl ConnectionTrait,
        content_id: &str,
    ) -> Result<bool, InternalError> {
        let result = achievement_reference::Entity::update_many()
            .set(achievement_reference::ActiveModel {
                updated_at: Set(Utc::now().timestamp()),
                ..Default::default()
            })
            .filter(achievement_reference::Column::ContentId.eq(content_id))
            .filter(achievement_reference::Column::Status.eq(AchievementStatus::Draft))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("touch_draft_reference", e))?;

        Ok(result.rows_affected == 1)
    }

    pub async fn count_active(&self, conn: &impl ConnectionTrait) -> Result<u64, InternalError> {
        achievement_reference::Entity::find()
            .filter(achievement_reference::Column::Status.ne(AchievementStatus::Deleted))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_active_references", e))
    }

    pub async fn count_with_status(
        &self,
        conn: &impl ConnectionTrait,
        status: AchievementStatus,
    ) -> Result<u64, InternalError> {
        achievement_reference::Entity::find()
            .filter(achievement_reference::Column::Status.eq(status))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_references_with_status", e))
    }
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{create_test_lecturer, create_test_student, setup_test_databases};

    #[tokio::test]
    async fn test_transition_requires_expected_status() {
        let (ledger, _content) = setup_test_databases().await;
        let (_user, student) = create_test_student(&ledger, "mhs1", None).await;
        let store = ReferenceStore::new();
        store.create_draft(&ledger, &student.id, "65a000000000000000000001").await.unwrap();

        let submitted = store
            .transition(
                &ledger,
                "65a000000000000000000001",
                AchievementStatus::Draft,
                AchievementStatus::Submitted,
                TransitionStamp {
                    submitted_at: Some(100),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(submitted);

        // Second submit finds no draft row
        let again = store
            .transition(
                &ledger,
                "65a000000000000000000001",
                AchievementStatus::Draft,
                AchievementStatus::Submitted,
                TransitionStamp::default(),
            )
            .await
            .unwrap();
        assert!(!again);

        let reference = store
            .find_by_content_id(&ledger, "65a000000000000000000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reference.status, AchievementStatus::Submitted);
        assert_eq!(reference.submitted_at, Some(100));
    }

    #[tokio::test]
    async fn test_deleted_reference_is_hidden() {
        let (ledger, _content) = setup_test_databases().await;
        let (_user, student) = create_test_student(&ledger, "mhs1", None).await;
        let store = ReferenceStore::new();
        store.create_draft(&ledger, &student.id, "65a000000000000000000002").await.unwrap();

        store
            .transition(
                &ledger,
                "65a000000000000000000002",
                AchievementStatus::Draft,
                AchievementStatus::Deleted,
                TransitionStamp::default(),
            )
            .await
            .unwrap();

        assert!(store.find_by_content_id(&ledger, "65a000000000000000000002").await.unwrap().is_none());
        assert!(
            store
                .find_by_content_id_any_status(&ledger, "65a000000000000000000002")
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(store.count_active(&ledger).await.unwrap(), 0);
        assert!(store.list_for_student(&ledger, &student.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_for_advisor_joins_students() {
        let (ledger, _content) = setup_test_databases().await;
        let (_advisor_user, advisor) = create_test_lecturer(&ledger, "dosen1").await;
        let (_other_user, other) = create_test_lecturer(&ledger, "dosen2").await;
        let (_u1, advisee) = create_test_student(&ledger, "mhs1", Some(&advisor.id)).await;
        let (_u2, stranger) = create_test_student(&ledger, "mhs2", Some(&other.id)).await;

        let store = ReferenceStore::new();
        store.create_draft(&ledger, &advisee.id, "65a000000000000000000003").await.unwrap();
        store.create_draft(&ledger, &stranger.id, "65a000000000000000000004").await.unwrap();

        let listed = store.list_for_advisor(&ledger, &advisor.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content_id, "65a000000000000000000003");
    }
}
