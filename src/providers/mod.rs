// Providers layer - Work performers and business logic
//
// Providers contain business logic and provide composable operations that
// coordinators can orchestrate. They perform actual work like hashing,
// token handling, permission checks and file storage.

pub mod crypto_provider;
pub mod file_storage;
pub mod permission_provider;
pub mod profile_provider;
pub mod token_provider;

// Re-export providers for clean imports
pub use crypto_provider::CryptoProvider;
pub use file_storage::{FileStorage, LocalFileStorage};
pub use permission_provider::PermissionProvider;
pub use profile_provider::ProfileProvider;
pub use token_provider::TokenProvider;
