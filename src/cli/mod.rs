// CLI module: server startup and administrative operations

pub mod migrate;
pub mod seed;
pub mod serve;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;
use crate::config::{BootstrapSettings, DatabaseConnections};
use crate::coordinators::AchievementCoordinator;

/// Student achievement backend
#[derive(Parser)]
#[command(name = "achievement-backend")]
#[command(about = "Student achievement reporting backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Migrate, sweep orphans in report mode and serve the HTTP API (default)
    Serve,

    /// Run pending migrations on both databases
    Migrate,

    /// Create the demo admin, advisor and student accounts
    Seed {
        /// Password given to every seeded account
        #[arg(long, env = "SEED_PASSWORD")]
        password: String,
    },

    /// List content documents without a live reference
    SweepOrphans {
        /// Delete the orphans instead of only reporting them
        #[arg(long)]
        purge: bool,
    },
}

/// Execute CLI command
///
/// Routes the parsed CLI command to the appropriate handler function.
pub async fn execute_command(cli: Cli, bootstrap_settings: BootstrapSettings) -> Result<(), Box<dyn std::error::Error>> {
    let connections = DatabaseConnections::init(&bootstrap_settings).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            serve::serve(connections, bootstrap_settings).await?;
        }
        Commands::Migrate => {
            migrate::run_migrations(&connections).await?;
        }
        Commands::Seed { password } => {
            connections.migrate().await?;
            let app_data = AppData::init(connections, &bootstrap_settings).await?;
            let summary = seed::seed_demo_data(&app_data, &password).await?;
            println!(
                "Seed finished: {} created, {} already present",
                summary.created, summary.skipped
            );
        }
        Commands::SweepOrphans { purge } => {
            connections.migrate().await?;
            let app_data = Arc::new(AppData::init(connections, &bootstrap_settings).await?);
            let report = AchievementCoordinator::new(app_data).sweep_orphans(purge).await?;
            println!(
                "Scanned {} content documents, {} orphaned, {} purged",
                report.scanned,
                report.orphans.len(),
                report.purged
            );
            for id in &report.orphans {
                println!("  {}", id);
            }
        }
    }

    Ok(())
}
