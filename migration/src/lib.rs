pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_ledger_schema;
mod m20250301_000002_seed_roles_permissions;
mod m20250301_000003_create_content_schema;

/// Migrations for the relational ledger (identity, profiles, achievement references).
pub struct LedgerMigrator;

#[async_trait::async_trait]
impl MigratorTrait for LedgerMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_ledger_schema::Migration),
            Box::new(m20250301_000002_seed_roles_permissions::Migration),
        ]
    }
}

/// Migrations for the achievement content store.
pub struct ContentMigrator;

#[async_trait::async_trait]
impl MigratorTrait for ContentMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000003_create_content_schema::Migration)]
    }
}
