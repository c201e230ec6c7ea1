use crate::config::DatabaseConnections;
use crate::errors::InternalError;

/// Run database migrations for the ledger and content databases
///
/// Does not initialize the full AppData, so no secrets are required.
pub async fn run_migrations(connections: &DatabaseConnections) -> Result<(), InternalError> {
    tracing::info!("Running database migrations...");

    connections.migrate().await?;

    tracing::info!("All migrations completed successfully");
    println!("Migrations applied to ledger and content databases");

    Ok(())
}
