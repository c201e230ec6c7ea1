use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::ProfileError;
use crate::types::db::{lecturer, student};

pub struct NewStudentProfile {
    pub user_id: String,
    pub student_number: String,
    pub program_study: Option<String>,
    pub academic_year: Option<String>,
    /// `lecturers.id` of the advisor
    pub advisor_id: Option<String>,
}

pub struct NewLecturerProfile {
    pub user_id: String,
    pub lecturer_number: String,
    pub department: Option<String>,
}

/// Student and lecturer profiles linked to user accounts
pub struct ProfileStore {}

impl ProfileStore {
    pub fn new() -> Self {
        Self {}
    }

    pub async fn find_student_by_user_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<student::Model>, InternalError> {
        student::Entity::find()
            .filter(student::Column::UserId.eq(user_id))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_student_by_user_id", e))
    }

    pub async fn find_student_by_id(
        &self,
        conn: &impl ConnectionTrait,
        student_id: &str,
    ) -> Result<Option<student::Model>, InternalError> {
        student::Entity::find_by_id(student_id.to_owned())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_student_by_id", e))
    }

    pub async fn find_lecturer_by_user_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<lecturer::Model>, InternalError> {
        lecturer::Entity::find()
            .filter(lecturer::Column::UserId.eq(user_id))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_lecturer_by_user_id", e))
    }

    pub async fn create_student(
        &self,
        conn: &impl ConnectionTrait,
        profile: NewStudentProfile,
    ) -> Result<student::Model, InternalError> {
        if self.find_student_by_user_id(conn, &profile.user_id).await?.is_some() {
            return Err(ProfileError::DuplicateProfile(profile.user_id).into());
        }
        if let Some(advisor_id) = &profile.advisor_id {
            let advisor = lecturer::Entity::find_by_id(advisor_id.clone())
                .one(conn)
                .await
                .map_err(|e| InternalError::database("find_advisor", e))?;
            if advisor.is_none() {
                return Err(ProfileError::LecturerNotFound {
                    lecturer_id: advisor_id.clone(),
                }
                .into());
            }
        }

        student::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(profile.user_id),
            student_id: Set(profile.student_number),
            program_study: Set(profile.program_study),
            academic_year: Set(profile.academic_year),
            advisor_id: Set(profile.advisor_id),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_student", e))
    }

    pub async fn create_lecturer(
        &self,
        conn: &impl ConnectionTrait,
        profile: NewLecturerProfile,
    ) -> Result<lecturer::Model, InternalError> {
        if self.find_lecturer_by_user_id(conn, &profile.user_id).await?.is_some() {
            return Err(ProfileError::DuplicateProfile(profile.user_id).into());
        }

        lecturer::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(profile.user_id),
            lecturer_id: Set(profile.lecturer_number),
            department: Set(profile.department),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_lecturer", e))
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{create_test_lecturer, create_test_user, setup_test_databases};

    #[tokio::test]
    async fn test_student_profile_is_unique_per_user() {
        let (ledger, _content) = setup_test_databases().await;
        let store = ProfileStore::new();
        let user = create_test_user(&ledger, "mhs", crate::test::utils::ROLE_ID_STUDENT).await;

        let profile = || NewStudentProfile {
            user_id: user.id.clone(),
            student_number: "202410099".to_string(),
            program_study: None,
            academic_year: None,
            advisor_id: None,
        };

        store.create_student(&ledger, profile()).await.unwrap();
        let second = store.create_student(&ledger, profile()).await;
        assert!(matches!(
            second,
            Err(InternalError::Profile(ProfileError::DuplicateProfile(_)))
        ));
    }

    #[tokio::test]
    async fn test_unknown_advisor_is_rejected() {
        let (ledger, _content) = setup_test_databases().await;
        let store = ProfileStore::new();
        let user = create_test_user(&ledger, "mhs", crate::test::utils::ROLE_ID_STUDENT).await;

        let result = store
            .create_student(
                &ledger,
                NewStudentProfile {
                    user_id: user.id,
                    student_number: "202410098".to_string(),
                    program_study: None,
                    academic_year: None,
                    advisor_id: Some("no-such-lecturer".to_string()),
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(InternalError::Profile(ProfileError::LecturerNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_lookup_by_user_id() {
        let (ledger, _content) = setup_test_databases().await;
        let store = ProfileStore::new();
        let (lecturer_user, lecturer) = create_test_lecturer(&ledger, "dosen").await;

        let found = store
            .find_lecturer_by_user_id(&ledger, &lecturer_user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, lecturer.id);
        assert!(store.find_student_by_user_id(&ledger, &lecturer_user.id).await.unwrap().is_none());
    }
}
