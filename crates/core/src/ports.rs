//! Collaborator traits.
//!
//! The core never talks to a database directly. Everything it reads or
//! writes goes through these traits, implemented over PostgreSQL by
//! `checkrun-db` and in memory by [`crate::memory`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use checkrun_shared::{CheckRunId, Ssn};

use crate::checks::types::{Demographic, Distribution, ProfitShareCheck};
use crate::error::CheckRunError;
use crate::workflow::types::{CheckRunWorkflow, WorkflowMutation};

/// Shared monotonic check number source.
#[async_trait]
pub trait CheckNumberSequence: Send + Sync {
    /// Returns `count` numbers, each taken with one atomic "next value".
    ///
    /// Numbers handed out are burned even if the caller later fails.
    async fn next_values(&self, count: usize) -> Result<Vec<i64>, CheckRunError>;
}

/// Read access to approved distributions outside any write scope.
#[async_trait]
pub trait DistributionReader: Send + Sync {
    /// Returns the subset of `ids` that exist.
    async fn find_existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, CheckRunError>;
}

/// Read access to identity records.
#[async_trait]
pub trait DemographicReader: Send + Sync {
    /// Returns every identity row whose SSN is in `ssns`.
    async fn find_by_ssns(&self, ssns: &[Ssn]) -> Result<Vec<Demographic>, CheckRunError>;
}

/// Persistence for check run workflows.
///
/// Implementations must enforce "at most one active run per profit year"
/// themselves and apply each mutation as one atomic read-modify-write.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Returns the active run for `profit_year`, if any.
    async fn find_active(&self, profit_year: i32)
    -> Result<Option<CheckRunWorkflow>, CheckRunError>;

    /// Returns the run with `id`, whatever its status.
    async fn find(&self, id: CheckRunId) -> Result<Option<CheckRunWorkflow>, CheckRunError>;

    /// Inserts a new run.
    ///
    /// Fails with [`CheckRunError::RunAlreadyActive`] when another active run
    /// exists for the same profit year.
    async fn insert(&self, run: CheckRunWorkflow) -> Result<CheckRunWorkflow, CheckRunError>;

    /// Applies `mutation` to the run with `id` under a lock.
    ///
    /// Returns `None` when the run does not exist.
    async fn modify(
        &self,
        id: CheckRunId,
        mutation: WorkflowMutation,
        now: DateTime<Utc>,
    ) -> Result<Option<CheckRunWorkflow>, CheckRunError>;
}

/// The append-only check ledger.
#[async_trait]
pub trait CheckLedger: Send + Sync {
    /// Opens an atomic read-write scope.
    async fn begin(&self) -> Result<Box<dyn CheckLedgerScope>, CheckRunError>;

    /// Returns every check issued for a run, voided or not, by check number.
    async fn checks_for_run(
        &self,
        run_id: CheckRunId,
    ) -> Result<Vec<ProfitShareCheck>, CheckRunError>;
}

/// One atomic read-write scope over the ledger.
///
/// Nothing done through a scope is visible to others until [`commit`];
/// dropping the scope without committing discards all of it.
///
/// [`commit`]: CheckLedgerScope::commit
#[async_trait]
pub trait CheckLedgerScope: Send + Sync {
    /// Voids every non-voided check of `run_id`. Returns how many were voided.
    async fn void_active_checks(
        &mut self,
        run_id: CheckRunId,
        void_date: NaiveDate,
    ) -> Result<u64, CheckRunError>;

    /// Applies a workflow mutation inside this scope.
    async fn modify_run(
        &mut self,
        run_id: CheckRunId,
        mutation: WorkflowMutation,
        now: DateTime<Utc>,
    ) -> Result<Option<CheckRunWorkflow>, CheckRunError>;

    /// Loads the distributions with `ids`, including payee names.
    async fn load_distributions(&mut self, ids: &[i64])
    -> Result<Vec<Distribution>, CheckRunError>;

    /// Identity reads that observe this scope.
    fn demographics(&self) -> &dyn DemographicReader;

    /// Writes all `checks` in one batch.
    async fn insert_checks(&mut self, checks: Vec<ProfitShareCheck>) -> Result<(), CheckRunError>;

    /// Makes every change of this scope durable.
    async fn commit(self: Box<Self>) -> Result<(), CheckRunError>;
}
