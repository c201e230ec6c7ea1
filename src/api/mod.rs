// API layer - HTTP endpoints
pub mod achievement;
pub mod auth;
pub mod health;

use std::sync::Arc;

pub use achievement::AchievementApi;
pub use auth::AuthApi;
pub use health::HealthApi;
use poem_openapi::{OpenApiService, Tags};

use crate::app_data::AppData;

/// API tags shared by every endpoint group
#[derive(Tags)]
pub enum ApiTags {
    /// Health check endpoints
    Health,
    /// Login, token refresh, logout and profile
    Authentication,
    /// Achievement workflow
    Achievements,
}

pub type ApiService = OpenApiService<(HealthApi, AuthApi, AchievementApi), ()>;

/// Assemble every endpoint group into one OpenAPI service
pub fn api_service(app_data: Arc<AppData>, server_url: &str) -> ApiService {
    OpenApiService::new(
        (HealthApi, AuthApi::new(app_data.clone()), AchievementApi::new(app_data)),
        "Student Achievement API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(server_url)
}
