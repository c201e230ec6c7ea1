// Stores layer - Data access and repository pattern
pub mod content_store;
pub mod credential_store;
pub mod identity_store;
pub mod profile_store;
pub mod reference_store;

pub use content_store::ContentStore;
pub use credential_store::CredentialStore;
pub use identity_store::IdentityStore;
pub use profile_store::ProfileStore;
pub use reference_store::ReferenceStore;
