// Errors layer - Error type definitions
pub mod api;
pub mod internal;

// Re-exports for convenience
pub use api::{AchievementApiError, AuthError};
pub use internal::{AchievementError, InternalError};

#[cfg(test)]
mod api_test;
