// Coordinators layer - Workflow orchestration
//
// Coordinators handle workflow orchestration by composing store and provider
// operations for specific API endpoints and CLI commands.

pub mod achievement_coordinator;
pub mod auth_coordinator;

pub use achievement_coordinator::AchievementCoordinator;
pub use auth_coordinator::{AuthCoordinator, LoginResult};
