use std::sync::Arc;

use poem::endpoint::StaticFilesEndpoint;
use poem::listener::TcpListener;
use poem::{Route, Server};

use crate::api;
use crate::app_data::AppData;
use crate::config::{BootstrapSettings, DatabaseConnections};
use crate::coordinators::{AchievementCoordinator, AuthCoordinator};
use crate::providers::file_storage::UPLOAD_URL_PREFIX;

/// Migrate, report orphans, drop expired refresh tokens and serve the API until the process is stopped
pub async fn serve(
    connections: DatabaseConnections,
    bootstrap_settings: BootstrapSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    connections.migrate().await?;

    let app_data = Arc::new(AppData::init(connections, &bootstrap_settings).await?);

    // Report only; purging is an explicit CLI action
    if let Err(e) = AchievementCoordinator::new(app_data.clone()).sweep_orphans(false).await {
        tracing::warn!("Startup orphan sweep failed: {}", e);
    }
    if let Err(e) = AuthCoordinator::new(app_data.clone()).purge_expired_tokens().await {
        tracing::warn!("Expired refresh token purge failed: {}", e);
    }

    let address = bootstrap_settings.server_address();
    let api_service = api::api_service(app_data, &format!("http://{}/api", address));
    let ui = api_service.swagger_ui();

    let app = Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .nest(UPLOAD_URL_PREFIX, StaticFilesEndpoint::new(bootstrap_settings.upload_dir()));

    tracing::info!("Starting server on http://{}", address);
    tracing::info!("Swagger UI available at http://{}/swagger", address);

    Server::new(TcpListener::bind(address)).run(app).await?;

    Ok(())
}
