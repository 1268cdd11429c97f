//! Migration runner for the check run schema.
//!
//! Usage:
//!   checkrun-migrator up      - Apply pending migrations
//!   checkrun-migrator down    - Roll back the last migration
//!   checkrun-migrator status  - List applied and pending migrations
//!
//! The connection string comes from `DATABASE_URL`.

use checkrun_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // run_cli installs its own tracing subscriber
    cli::run_cli(Migrator).await;
}
