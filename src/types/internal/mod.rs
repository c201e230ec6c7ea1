// Internal domain types - never exposed on the wire directly
pub mod achievement;
pub mod auth;
pub mod context;
pub mod principal;

pub use context::{RequestContext, RequestId, RequestSource};
pub use principal::{Principal, RoleKind};
