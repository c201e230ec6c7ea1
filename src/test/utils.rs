// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Arc;

use chrono::Utc;
use migration::{ContentMigrator, LedgerMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use crate::app_data::AppData;
use crate::config::{DatabaseConnections, SecretManager};
use crate::providers::{CryptoProvider, LocalFileStorage};
use crate::stores::content_store::new_content_id;
use crate::stores::identity_store::NewUser;
use crate::stores::profile_store::{NewLecturerProfile, NewStudentProfile};
use crate::stores::{IdentityStore, ProfileStore};
use crate::types::db::{lecturer, student, user};
use crate::types::internal::RequestContext;
use crate::types::internal::achievement::{AchievementContent, AchievementDetails, AchievementType};
use crate::types::internal::auth::Claims;

// Role ids seeded by the ledger migrations
pub const ROLE_ID_ADMIN: &str = "0b9d7f4e-3c1a-4e8b-9f2d-6a5c4b3a2e10";
pub const ROLE_ID_STUDENT: &str = "5e2f8a1c-7d4b-4c9e-a3f6-1b0d9e8c7f21";
pub const ROLE_ID_ADVISOR: &str = "9c4a6e2d-1f8b-4a7c-b5e3-2d1f0a9b8c32";

pub const TEST_JWT_SECRET: &str = "test-secret-key-minimum-32-characters-long";
pub const TEST_PEPPER: &str = "test-pepper-for-unit-tests";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret-minimum-32-chars";

/// Creates the ledger and content databases in memory with migrations applied
///
/// Returns (ledger, content)
pub async fn setup_test_databases() -> (DatabaseConnection, DatabaseConnection) {
    let ledger = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create ledger database");
    LedgerMigrator::up(&ledger, None)
        .await
        .expect("Failed to run ledger migrations");

    let content = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create content database");
    ContentMigrator::up(&content, None)
        .await
        .expect("Failed to run content migrations");

    (ledger, content)
}

pub fn test_secret_manager() -> Arc<SecretManager> {
    Arc::new(
        SecretManager::from_values(TEST_JWT_SECRET, TEST_PEPPER, TEST_REFRESH_SECRET)
            .expect("Failed to build test SecretManager"),
    )
}

/// Full AppData over fresh in-memory databases and a throwaway upload directory
pub async fn setup_test_app_data() -> Arc<AppData> {
    let (ledger, content) = setup_test_databases().await;
    let upload_dir = std::env::temp_dir().join(format!("achievement-uploads-{}", Uuid::new_v4()));

    Arc::new(AppData::new(
        DatabaseConnections::from_connections(ledger, content),
        test_secret_manager(),
        Arc::new(LocalFileStorage::new(upload_dir)),
    ))
}

/// Inserts an active user whose password hash is not usable for login
pub async fn create_test_user(ledger: &DatabaseConnection, username: &str, role_id: &str) -> user::Model {
    insert_user(ledger, username, role_id, "not-a-password-hash".to_string()).await
}

/// Inserts an active user that can log in with `password`
pub async fn create_test_user_with_password(
    ledger: &DatabaseConnection,
    username: &str,
    role_id: &str,
    password: &str,
) -> user::Model {
    let hash = CryptoProvider::new(test_secret_manager())
        .hash_password(password)
        .await
        .expect("Failed to hash test password");
    insert_user(ledger, username, role_id, hash).await
}

async fn insert_user(ledger: &DatabaseConnection, username: &str, role_id: &str, password_hash: String) -> user::Model {
    IdentityStore::new()
        .create_user(
            ledger,
            NewUser {
                username: username.to_string(),
                email: format!("{}@example.ac.id", username),
                password_hash,
                full_name: format!("Test {}", username),
                role_id: role_id.to_string(),
            },
        )
        .await
        .expect("Failed to create test user")
}

/// Creates an advisor user with a lecturer profile
pub async fn create_test_lecturer(ledger: &DatabaseConnection, username: &str) -> (user::Model, lecturer::Model) {
    let user = create_test_user(ledger, username, ROLE_ID_ADVISOR).await;
    let lecturer = ProfileStore::new()
        .create_lecturer(
            ledger,
            NewLecturerProfile {
                user_id: user.id.clone(),
                lecturer_number: format!("DOS-{}", username),
                department: Some("Teknik Informatika".to_string()),
            },
        )
        .await
        .expect("Failed to create test lecturer");
    (user, lecturer)
}

/// Creates a student user with a student profile, optionally assigned to an advisor
pub async fn create_test_student(
    ledger: &DatabaseConnection,
    username: &str,
    advisor_id: Option<&str>,
) -> (user::Model, student::Model) {
    let user = create_test_user(ledger, username, ROLE_ID_STUDENT).await;
    let student = ProfileStore::new()
        .create_student(
            ledger,
            NewStudentProfile {
                user_id: user.id.clone(),
                student_number: format!("NIM-{}", username),
                program_study: Some("Teknik Informatika".to_string()),
                academic_year: Some("2024".to_string()),
                advisor_id: advisor_id.map(str::to_string),
            },
        )
        .await
        .expect("Failed to create test student");
    (user, student)
}

/// An `other`-typed content document with a fresh id
pub fn sample_content(student_id: &str, title: &str) -> AchievementContent {
    let now = Utc::now();
    AchievementContent {
        id: new_content_id(),
        student_id: student_id.to_string(),
        achievement_type: AchievementType::Other,
        title: title.to_string(),
        description: format!("{} description", title),
        details: AchievementDetails::empty(AchievementType::Other),
        attachments: Vec::new(),
        tags: vec!["test".to_string()],
        points: 10,
        created_at: now,
        updated_at: now,
    }
}

/// An API request context carrying valid-looking claims
pub fn authenticated_context(user_id: &str, role_id: &str) -> RequestContext {
    let now = Utc::now().timestamp();
    RequestContext::for_api()
        .with_auth(Claims {
            sub: user_id.to_string(),
            role_id: role_id.to_string(),
            exp: now + 900,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        })
        .with_actor_id(user_id)
}
