//! Repository implementations of the core collaborator traits.

pub mod check_ledger;
pub mod check_number;
pub mod demographic;
pub mod distribution;
pub mod workflow;

pub use check_ledger::CheckLedgerRepository;
pub use check_number::CheckNumberRepository;
pub use demographic::DemographicRepository;
pub use distribution::DistributionRepository;
pub use workflow::WorkflowRepository;

use checkrun_core::CheckRunError;
use checkrun_shared::Ssn;
use sea_orm::DbErr;

/// Keys per `IN (...)` list, well under PostgreSQL's bind parameter cap.
const IN_LIST_CHUNK: usize = 10_000;

fn db_err(err: DbErr) -> CheckRunError {
    CheckRunError::Database(err.to_string())
}

fn ssn_from_column(value: i32, table: &str) -> Result<Ssn, CheckRunError> {
    Ssn::new(value).map_err(|e| CheckRunError::Database(format!("{table}: {e}")))
}
