use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Role not found: {role_id}")]
    RoleNotFound { role_id: String },

    #[error("Lecturer not found: {lecturer_id}")]
    LecturerNotFound { lecturer_id: String },

    #[error("Duplicate profile: {0}")]
    DuplicateProfile(String),
}
