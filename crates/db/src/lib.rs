//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository implementations of the `checkrun-core` collaborator traits
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

use std::sync::Arc;
use std::time::Duration;

pub use repositories::{
    CheckLedgerRepository, CheckNumberRepository, DemographicRepository, DistributionRepository,
    WorkflowRepository,
};

use checkrun_core::{CheckRunCollaborators, Clock};
use checkrun_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the `database` config section.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Builds the generator's collaborators over one connection pool.
#[must_use]
pub fn collaborators(db: &DatabaseConnection, clock: Arc<dyn Clock>) -> CheckRunCollaborators {
    CheckRunCollaborators {
        sequence: Arc::new(CheckNumberRepository::new(db.clone())),
        distributions: Arc::new(DistributionRepository::new(db.clone())),
        workflows: Arc::new(WorkflowRepository::new(db.clone())),
        ledger: Arc::new(CheckLedgerRepository::new(db.clone())),
        clock,
    }
}
