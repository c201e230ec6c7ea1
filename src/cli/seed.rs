// Seed command implementation
// Provisions the demo identities: one admin, three advisors and three advised students

use std::collections::HashMap;

use sea_orm::ConnectionTrait;

use crate::app_data::AppData;
use crate::config::commit_transaction;
use crate::errors::InternalError;
use crate::errors::internal::ProfileError;
use crate::providers::CryptoProvider;
use crate::stores::identity_store::NewUser;
use crate::stores::profile_store::{NewLecturerProfile, NewStudentProfile};
use crate::types::internal::RequestContext;
use crate::types::internal::principal::{ROLE_ADMIN, ROLE_ADVISOR, ROLE_STUDENT};

const DEPARTMENT: &str = "Teknik Informatika";
const ACADEMIC_YEAR: &str = "2024";

/// (username, full name, lecturer number)
const ADVISORS: &[(&str, &str, &str)] = &[
    ("dosen1", "Prof. Dr. Ahmad Wijaya, S.T., M.T.", "DOS001"),
    ("dosen2", "Dr. Siti Nurhaliza, S.Kom., M.Kom.", "DOS002"),
    ("dosen3", "Dr. Budi Santoso, S.T., M.Sc.", "DOS003"),
];

/// (username, full name, student number, advisor username)
const STUDENTS: &[(&str, &str, &str, &str)] = &[
    ("mahasiswa1", "Andi Pratama", "202410001", "dosen1"),
    ("mahasiswa2", "Budi Setiawan", "202410002", "dosen2"),
    ("mahasiswa3", "Citra Dewi", "202410003", "dosen3"),
];

/// Counts of what a seed run created
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Create the demo accounts that do not exist yet, all with the same password
///
/// Runs in one ledger transaction; existing usernames are left untouched.
pub async fn seed_demo_data(app_data: &AppData, password: &str) -> Result<SeedSummary, InternalError> {
    let ctx = RequestContext::for_cli("seed");
    let crypto = CryptoProvider::new(app_data.secret_manager.clone());
    let password_hash = crypto.hash_password(password).await?;

    let txn = app_data.connections.begin_ledger_transaction().await?;
    let mut summary = SeedSummary::default();

    let admin_role = role_id(app_data, &txn, ROLE_ADMIN).await?;
    let advisor_role = role_id(app_data, &txn, ROLE_ADVISOR).await?;
    let student_role = role_id(app_data, &txn, ROLE_STUDENT).await?;

    if ensure_user(app_data, &txn, "admin", "System Administrator", &admin_role, &password_hash)
        .await?
        .1
    {
        summary.created += 1;
    } else {
        summary.skipped += 1;
    }

    let mut lecturer_ids: HashMap<&str, String> = HashMap::new();
    for (username, full_name, lecturer_number) in ADVISORS {
        let (user_id, created) =
            ensure_user(app_data, &txn, username, full_name, &advisor_role, &password_hash).await?;
        let lecturer = match app_data.profile_store.find_lecturer_by_user_id(&txn, &user_id).await? {
            Some(lecturer) => lecturer,
            None => {
                app_data
                    .profile_store
                    .create_lecturer(
                        &txn,
                        NewLecturerProfile {
                            user_id: user_id.clone(),
                            lecturer_number: lecturer_number.to_string(),
                            department: Some(DEPARTMENT.to_string()),
                        },
                    )
                    .await?
            }
        };
        lecturer_ids.insert(username, lecturer.id);
        if created {
            summary.created += 1;
        } else {
            summary.skipped += 1;
        }
    }

    for (username, full_name, student_number, advisor) in STUDENTS {
        let (user_id, created) =
            ensure_user(app_data, &txn, username, full_name, &student_role, &password_hash).await?;
        if app_data.profile_store.find_student_by_user_id(&txn, &user_id).await?.is_none() {
            app_data
                .profile_store
                .create_student(
                    &txn,
                    NewStudentProfile {
                        user_id,
                        student_number: student_number.to_string(),
                        program_study: Some(DEPARTMENT.to_string()),
                        academic_year: Some(ACADEMIC_YEAR.to_string()),
                        advisor_id: lecturer_ids.get(advisor).cloned(),
                    },
                )
                .await?;
        }
        if created {
            summary.created += 1;
        } else {
            summary.skipped += 1;
        }
    }

    commit_transaction(txn).await?;

    tracing::info!(
        actor = %ctx.actor_id,
        created = summary.created,
        skipped = summary.skipped,
        "Demo identities seeded"
    );

    Ok(summary)
}

async fn role_id(app_data: &AppData, conn: &impl ConnectionTrait, name: &str) -> Result<String, InternalError> {
    app_data
        .identity_store
        .find_role_by_name(conn, name)
        .await?
        .map(|role| role.id)
        .ok_or_else(|| {
            ProfileError::RoleNotFound {
                role_id: name.to_string(),
            }
            .into()
        })
}

/// Existing user id, or a freshly created one; the flag tells which
async fn ensure_user(
    app_data: &AppData,
    conn: &impl ConnectionTrait,
    username: &str,
    full_name: &str,
    role_id: &str,
    password_hash: &str,
) -> Result<(String, bool), InternalError> {
    if let Some(existing) = app_data.identity_store.find_user_by_identifier(conn, username).await? {
        tracing::debug!("User {} already exists, skipping", username);
        return Ok((existing.id, false));
    }

    let user = app_data
        .identity_store
        .create_user(
            conn,
            NewUser {
                username: username.to_string(),
                email: format!("{}@gmail.com", username),
                password_hash: password_hash.to_string(),
                full_name: full_name.to_string(),
                role_id: role_id.to_string(),
            },
        )
        .await?;

    println!("Created {} ({})", username, full_name);
    Ok((user.id, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_app_data;

    #[tokio::test]
    async fn test_seed_creates_demo_identities_once() {
        let app_data = setup_test_app_data().await;

        let first = seed_demo_data(&app_data, "demo-password").await.unwrap();
        assert_eq!(first, SeedSummary { created: 7, skipped: 0 });

        let second = seed_demo_data(&app_data, "demo-password").await.unwrap();
        assert_eq!(second, SeedSummary { created: 0, skipped: 7 });
    }

    #[tokio::test]
    async fn test_seeded_students_have_their_advisor() {
        let app_data = setup_test_app_data().await;
        seed_demo_data(&app_data, "demo-password").await.unwrap();
        let ledger = &app_data.connections.ledger;

        let student_user = app_data
            .identity_store
            .find_user_by_identifier(ledger, "mahasiswa2")
            .await
            .unwrap()
            .unwrap();
        let advisor_user = app_data
            .identity_store
            .find_user_by_identifier(ledger, "dosen2")
            .await
            .unwrap()
            .unwrap();

        let student = app_data
            .profile_store
            .find_student_by_user_id(ledger, &student_user.id)
            .await
            .unwrap()
            .unwrap();
        let lecturer = app_data
            .profile_store
            .find_lecturer_by_user_id(ledger, &advisor_user.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(student.student_id, "202410002");
        assert_eq!(student.advisor_id, Some(lecturer.id));
        assert_eq!(lecturer.lecturer_id, "DOS002");
    }
}
