use migration::{ContentMigrator, LedgerMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::config::BootstrapSettings;
use crate::errors::InternalError;

/// The two independent connections: the relational ledger and the content documents
///
/// They are never enlisted in one transaction; cross-store consistency is handled
/// by the achievement coordinator.
#[derive(Clone)]
pub struct DatabaseConnections {
    pub ledger: DatabaseConnection,
    pub content: DatabaseConnection,
}

impl DatabaseConnections {
    pub async fn init(bootstrap_settings: &BootstrapSettings) -> Result<Self, InternalError> {
        let ledger = Self::connect(bootstrap_settings.database_url(), "connect_ledger_database").await?;
        let content =
            Self::connect(bootstrap_settings.content_database_url(), "connect_content_database").await?;

        Ok(Self { ledger, content })
    }

    pub fn from_connections(ledger: DatabaseConnection, content: DatabaseConnection) -> Self {
        Self { ledger, content }
    }

    async fn connect(url: &str, operation: &str) -> Result<DatabaseConnection, InternalError> {
        let db = Database::connect(url)
            .await
            .map_err(|e| InternalError::database(operation, e))?;

        tracing::debug!("Connected to database: {}", url);

        Ok(db)
    }

    /// Run pending migrations on both databases
    pub async fn migrate(&self) -> Result<(), InternalError> {
        LedgerMigrator::up(&self.ledger, None)
            .await
            .map_err(|e| InternalError::database("run_ledger_migrations", e))?;
        tracing::debug!("Ledger database migrations completed");

        ContentMigrator::up(&self.content, None)
            .await
            .map_err(|e| InternalError::database("run_content_migrations", e))?;
        tracing::debug!("Content database migrations completed");

        Ok(())
    }

    pub async fn begin_ledger_transaction(&self) -> Result<DatabaseTransaction, InternalError> {
        self.ledger.begin().await.map_err(InternalError::transaction_begin)
    }
}

pub async fn commit_transaction(txn: DatabaseTransaction) -> Result<(), InternalError> {
    txn.commit().await.map_err(InternalError::transaction_commit)
}
