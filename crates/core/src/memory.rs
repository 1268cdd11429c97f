//! In-memory implementations of the collaborator traits.
//!
//! One [`InMemoryCheckRunStore`] backs every port at once. A ledger scope
//! holds the store lock for its whole lifetime and works on a staged copy,
//! so other callers see either none or all of its changes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use checkrun_shared::{CheckRunId, Ssn};

use crate::checks::types::{Demographic, Distribution, ProfitShareCheck};
use crate::error::CheckRunError;
use crate::ports::{
    CheckLedger, CheckLedgerScope, CheckNumberSequence, DemographicReader, DistributionReader,
    WorkflowStore,
};
use crate::workflow::types::{CheckRunWorkflow, WorkflowMutation};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    workflows: HashMap<CheckRunId, CheckRunWorkflow>,
    checks: BTreeMap<i64, ProfitShareCheck>,
    distributions: BTreeMap<i64, Distribution>,
    demographics: Vec<Demographic>,
}

impl MemoryState {
    fn find_active(&self, profit_year: i32) -> Option<&CheckRunWorkflow> {
        self.workflows
            .values()
            .find(|run| run.profit_year == profit_year && run.is_active())
    }

    fn modify(
        &mut self,
        id: CheckRunId,
        mutation: &WorkflowMutation,
        now: DateTime<Utc>,
    ) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
        let Some(run) = self.workflows.get_mut(&id) else {
            return Ok(None);
        };
        run.apply(mutation, now)?;
        Ok(Some(run.clone()))
    }

    fn demographics_for(&self, ssns: &[Ssn]) -> Vec<Demographic> {
        self.demographics
            .iter()
            .filter(|d| ssns.contains(&d.ssn))
            .cloned()
            .collect()
    }
}

/// Process-local store for tests and dry runs.
#[derive(Debug, Clone)]
pub struct InMemoryCheckRunStore {
    state: Arc<Mutex<MemoryState>>,
    next_check_number: Arc<AtomicI64>,
}

impl Default for InMemoryCheckRunStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCheckRunStore {
    /// Creates an empty store whose sequence starts at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_first_check_number(1)
    }

    /// Creates an empty store whose sequence starts at `first`.
    #[must_use]
    pub fn with_first_check_number(first: i64) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            next_check_number: Arc::new(AtomicI64::new(first)),
        }
    }

    /// Adds or replaces a distribution.
    pub async fn insert_distribution(&self, distribution: Distribution) {
        self.state
            .lock()
            .await
            .distributions
            .insert(distribution.id, distribution);
    }

    /// Removes a distribution, as if deleted by another process.
    pub async fn remove_distribution(&self, id: i64) -> Option<Distribution> {
        self.state.lock().await.distributions.remove(&id)
    }

    /// Adds an identity record.
    pub async fn insert_demographic(&self, demographic: Demographic) {
        self.state.lock().await.demographics.push(demographic);
    }

    /// Every stored check, ordered by check number.
    pub async fn checks(&self) -> Vec<ProfitShareCheck> {
        self.state.lock().await.checks.values().cloned().collect()
    }

    /// Every stored run, in no particular order.
    pub async fn workflows(&self) -> Vec<CheckRunWorkflow> {
        self.state.lock().await.workflows.values().cloned().collect()
    }
}

#[async_trait]
impl CheckNumberSequence for InMemoryCheckRunStore {
    async fn next_values(&self, count: usize) -> Result<Vec<i64>, CheckRunError> {
        Ok((0..count)
            .map(|_| self.next_check_number.fetch_add(1, Ordering::SeqCst))
            .collect())
    }
}

#[async_trait]
impl DistributionReader for InMemoryCheckRunStore {
    async fn find_existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, CheckRunError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| state.distributions.contains_key(id))
            .collect())
    }
}

#[async_trait]
impl DemographicReader for InMemoryCheckRunStore {
    async fn find_by_ssns(&self, ssns: &[Ssn]) -> Result<Vec<Demographic>, CheckRunError> {
        Ok(self.state.lock().await.demographics_for(ssns))
    }
}

#[async_trait]
impl WorkflowStore for InMemoryCheckRunStore {
    async fn find_active(
        &self,
        profit_year: i32,
    ) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
        Ok(self.state.lock().await.find_active(profit_year).cloned())
    }

    async fn find(&self, id: CheckRunId) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
        Ok(self.state.lock().await.workflows.get(&id).cloned())
    }

    async fn insert(&self, run: CheckRunWorkflow) -> Result<CheckRunWorkflow, CheckRunError> {
        let mut state = self.state.lock().await;
        if run.is_active() && state.find_active(run.profit_year).is_some() {
            return Err(CheckRunError::RunAlreadyActive {
                profit_year: run.profit_year,
            });
        }
        state.workflows.insert(run.id, run.clone());
        Ok(run)
    }

    async fn modify(
        &self,
        id: CheckRunId,
        mutation: WorkflowMutation,
        now: DateTime<Utc>,
    ) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
        self.state.lock().await.modify(id, &mutation, now)
    }
}

#[async_trait]
impl CheckLedger for InMemoryCheckRunStore {
    async fn begin(&self) -> Result<Box<dyn CheckLedgerScope>, CheckRunError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryScope { guard, staged }))
    }

    async fn checks_for_run(
        &self,
        run_id: CheckRunId,
    ) -> Result<Vec<ProfitShareCheck>, CheckRunError> {
        Ok(self
            .state
            .lock()
            .await
            .checks
            .values()
            .filter(|check| check.check_run_workflow_id == run_id)
            .cloned()
            .collect())
    }
}

/// Staged copy of the store, published on commit.
struct MemoryScope {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl DemographicReader for MemoryScope {
    async fn find_by_ssns(&self, ssns: &[Ssn]) -> Result<Vec<Demographic>, CheckRunError> {
        Ok(self.staged.demographics_for(ssns))
    }
}

#[async_trait]
impl CheckLedgerScope for MemoryScope {
    async fn void_active_checks(
        &mut self,
        run_id: CheckRunId,
        void_date: NaiveDate,
    ) -> Result<u64, CheckRunError> {
        let mut voided = 0;
        for check in self.staged.checks.values_mut() {
            if check.check_run_workflow_id == run_id && !check.is_voided {
                check.is_voided = true;
                check.void_date = Some(void_date);
                voided += 1;
            }
        }
        Ok(voided)
    }

    async fn modify_run(
        &mut self,
        run_id: CheckRunId,
        mutation: WorkflowMutation,
        now: DateTime<Utc>,
    ) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
        self.staged.modify(run_id, &mutation, now)
    }

    async fn load_distributions(
        &mut self,
        ids: &[i64],
    ) -> Result<Vec<Distribution>, CheckRunError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.staged.distributions.get(id).cloned())
            .collect())
    }

    fn demographics(&self) -> &dyn DemographicReader {
        self
    }

    async fn insert_checks(&mut self, checks: Vec<ProfitShareCheck>) -> Result<(), CheckRunError> {
        for check in checks {
            if self.staged.checks.contains_key(&check.check_number) {
                return Err(CheckRunError::Database(format!(
                    "duplicate check number {}",
                    check.check_number
                )));
            }
            self.staged.checks.insert(check.check_number, check);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), CheckRunError> {
        let Self { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}
