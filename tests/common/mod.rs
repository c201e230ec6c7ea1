// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use achievement_backend::AppData;
use achievement_backend::config::{DatabaseConnections, SecretManager};
use achievement_backend::providers::LocalFileStorage;
use achievement_backend::stores::identity_store::NewUser;
use achievement_backend::stores::profile_store::{NewLecturerProfile, NewStudentProfile};
use achievement_backend::types::internal::RequestContext;
use migration::{ContentMigrator, LedgerMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

pub const ROLE_ID_ADMIN: &str = "0b9d7f4e-3c1a-4e8b-9f2d-6a5c4b3a2e10";
pub const ROLE_ID_STUDENT: &str = "5e2f8a1c-7d4b-4c9e-a3f6-1b0d9e8c7f21";
pub const ROLE_ID_ADVISOR: &str = "9c4a6e2d-1f8b-4a7c-b5e3-2d1f0a9b8c32";

pub const PASSWORD: &str = "integration-password";

/// Creates the ledger and content databases with migrations applied
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
        SecretManager::from_values(
            "integration-jwt-secret-at-least-32-chars",
            "integration-pepper",
            "integration-refresh-secret-32-characters",
        )
        .expect("Failed to build SecretManager"),
    )
}

pub async fn setup_app_data() -> Arc<AppData> {
    let (ledger, content) = setup_test_databases().await;
    let upload_dir = std::env::temp_dir().join(format!("achievement-it-{}", uuid::Uuid::new_v4()));

    Arc::new(AppData::new(
        DatabaseConnections::from_connections(ledger, content),
        test_secret_manager(),
        Arc::new(LocalFileStorage::new(upload_dir)),
    ))
}

/// Inserts a user that can log in with [`PASSWORD`]; returns the user id
pub async fn create_user(app_data: &AppData, username: &str, role_id: &str) -> String {
    let hash = achievement_backend::providers::CryptoProvider::new(app_data.secret_manager.clone())
        .hash_password(PASSWORD)
        .await
        .expect("Failed to hash password");

    app_data
        .identity_store
        .create_user(
            &app_data.connections.ledger,
            NewUser {
                username: username.to_string(),
                email: format!("{}@example.ac.id", username),
                password_hash: hash,
                full_name: username.to_uppercase(),
                role_id: role_id.to_string(),
            },
        )
        .await
        .expect("Failed to create user")
        .id
}

/// Advisor user plus lecturer profile; returns (user id, lecturer id)
pub async fn create_advisor(app_data: &AppData, username: &str) -> (String, String) {
    let user_id = create_user(app_data, username, ROLE_ID_ADVISOR).await;
    let lecturer = app_data
        .profile_store
        .create_lecturer(
            &app_data.connections.ledger,
            NewLecturerProfile {
                user_id: user_id.clone(),
                lecturer_number: format!("DOS-{}", username),
                department: None,
            },
        )
        .await
        .expect("Failed to create lecturer");
    (user_id, lecturer.id)
}

/// Student user plus profile advised by `advisor_id`; returns the user id
pub async fn create_student(app_data: &AppData, username: &str, advisor_id: &str) -> String {
    let user_id = create_user(app_data, username, ROLE_ID_STUDENT).await;
    app_data
        .profile_store
        .create_student(
            &app_data.connections.ledger,
            NewStudentProfile {
                user_id: user_id.clone(),
                student_number: format!("NIM-{}", username),
                program_study: None,
                academic_year: None,
                advisor_id: Some(advisor_id.to_string()),
            },
        )
        .await
        .expect("Failed to create student");
    user_id
}

/// Context for a caller authenticated by a freshly issued access token
pub fn context_for(app_data: &AppData, user_id: &str, role_id: &str) -> RequestContext {
    let (token, _jti) = app_data
        .token_provider
        .generate_jwt(user_id, role_id)
        .expect("Failed to issue token");
    let claims = app_data.token_provider.validate_jwt(&token).expect("Token must validate");
    RequestContext::for_api().with_auth(claims).with_actor_id(user_id)
}

/// Helper to manage environment variables in tests
///
/// Cleans up specified environment variables on creation and drop,
/// ensuring test isolation when dealing with global environment state.
pub struct EnvGuard {
    vars: Vec<String>,
}

impl EnvGuard {
    pub fn new(vars: Vec<&str>) -> Self {
        for var in &vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
        Self {
            vars: vars.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}

/// Global mutex for tests that modify environment variables
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());
