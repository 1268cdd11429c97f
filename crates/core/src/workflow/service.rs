//! Run workflow manager.
//!
//! Owns the check run state machine: starting runs, finding the active run
//! for a profit year, recording step completion, and enforcing the reprint
//! policy. The rules live here; atomicity is the store's job.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use checkrun_shared::CheckRunId;

use crate::clock::Clock;
use crate::error::CheckRunError;
use crate::ports::WorkflowStore;
use crate::workflow::types::{CheckRunWorkflow, NewCheckRun, WorkflowMutation};

/// Manages check run workflows.
#[derive(Clone)]
pub struct RunWorkflowManager {
    store: Arc<dyn WorkflowStore>,
    clock: Arc<dyn Clock>,
    max_reprint_count: i32,
}

fn run_not_found(run_id: CheckRunId) -> CheckRunError {
    CheckRunError::NotFound(format!("Check run workflow {run_id} not found"))
}

impl RunWorkflowManager {
    /// Creates a manager whose new runs get `max_reprint_count`.
    #[must_use]
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        clock: Arc<dyn Clock>,
        max_reprint_count: i32,
    ) -> Self {
        Self {
            store,
            clock,
            max_reprint_count,
        }
    }

    /// Today's date according to the manager's clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Audit timestamp according to the manager's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Starts a new run for `profit_year`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckRunError::RunAlreadyActive`] if the year already has an
    /// active run.
    pub async fn start_new_run(
        &self,
        profit_year: i32,
        check_run_date: NaiveDate,
        starting_check_number: i64,
        user: &str,
    ) -> Result<CheckRunWorkflow, CheckRunError> {
        info!(
            profit_year,
            check_number = starting_check_number,
            %check_run_date,
            user,
            "Starting new check run workflow"
        );

        if let Some(existing) = self.store.find_active(profit_year).await? {
            warn!(
                run_id = %existing.id,
                profit_year,
                "Active check run workflow already exists"
            );
            return Err(CheckRunError::RunAlreadyActive { profit_year });
        }

        let run = CheckRunWorkflow::start(
            NewCheckRun {
                profit_year,
                check_run_date,
                check_number: starting_check_number,
                max_reprint_count: self.max_reprint_count,
                created_by: user.to_string(),
            },
            self.clock.now(),
        );
        let run = self.store.insert(run).await?;

        info!(
            run_id = %run.id,
            profit_year,
            check_number = run.check_number,
            "Created new check run workflow"
        );
        Ok(run)
    }

    /// Returns the active run for `profit_year`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckRunError::NotFound`] when the year has no active run.
    pub async fn get_current_run(
        &self,
        profit_year: i32,
    ) -> Result<CheckRunWorkflow, CheckRunError> {
        let Some(run) = self.store.find_active(profit_year).await? else {
            warn!(profit_year, "No active check run workflow found");
            return Err(CheckRunError::NotFound(format!(
                "No active check run found for profit year {profit_year}"
            )));
        };

        info!(
            run_id = %run.id,
            profit_year,
            step_number = run.step_number,
            step_status = %run.step_status,
            "Found active check run workflow"
        );
        Ok(run)
    }

    /// Returns the run with `run_id`, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`CheckRunError::NotFound`] when the run does not exist.
    pub async fn get_run(&self, run_id: CheckRunId) -> Result<CheckRunWorkflow, CheckRunError> {
        self.store
            .find(run_id)
            .await?
            .ok_or_else(|| run_not_found(run_id))
    }

    /// Marks the current step completed and advances the step number.
    ///
    /// A completed run no longer counts as active, so it is not returned by
    /// [`get_current_run`](Self::get_current_run) afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CheckRunError::NotFound`] when the run does not exist.
    pub async fn record_step_completion(
        &self,
        run_id: CheckRunId,
        step_number: i32,
        user: &str,
    ) -> Result<CheckRunWorkflow, CheckRunError> {
        info!(%run_id, step_number, user, "Recording step completion");

        let run = self
            .mutate(
                run_id,
                WorkflowMutation::CompleteStep {
                    step_number,
                    user: user.to_string(),
                },
            )
            .await?;

        info!(
            %run_id,
            step_number,
            next_step_number = run.step_number,
            "Completed check run step"
        );
        Ok(run)
    }

    /// True iff the run has reprints left and was run today.
    ///
    /// # Errors
    ///
    /// Returns [`CheckRunError::NotFound`] when the run does not exist.
    pub async fn can_reprint(&self, run_id: CheckRunId) -> Result<bool, CheckRunError> {
        let run = self.get_run(run_id).await.inspect_err(|_| {
            warn!(%run_id, "Check run workflow not found");
        })?;

        let today = self.clock.today();
        let can_reprint = run.can_reprint(today);

        info!(
            %run_id,
            reprint_count = run.reprint_count,
            max_reprint_count = run.max_reprint_count,
            check_run_date = %run.check_run_date,
            %today,
            can_reprint,
            "Reprint eligibility checked"
        );
        Ok(can_reprint)
    }

    /// Counts one more reprint against the run.
    ///
    /// # Errors
    ///
    /// Returns [`CheckRunError::NotFound`] when the run does not exist.
    pub async fn increment_reprint_count(
        &self,
        run_id: CheckRunId,
        user: &str,
    ) -> Result<CheckRunWorkflow, CheckRunError> {
        let run = self
            .mutate(
                run_id,
                WorkflowMutation::IncrementReprintCount {
                    user: user.to_string(),
                },
            )
            .await?;

        info!(
            %run_id,
            reprint_count = run.reprint_count,
            "Incremented reprint count"
        );
        Ok(run)
    }

    /// Counts one reprint against the run if it is still reprintable today.
    ///
    /// Eligibility is re-checked inside the store's atomic mutation, so two
    /// concurrent callers can never push the count past the limit.
    ///
    /// # Errors
    ///
    /// - [`CheckRunError::NotFound`] when the run does not exist.
    /// - Validation failure on `IsReprint` when the limit is reached or the
    ///   run is not from today.
    pub async fn consume_reprint(
        &self,
        run_id: CheckRunId,
        user: &str,
    ) -> Result<CheckRunWorkflow, CheckRunError> {
        let run = self
            .mutate(
                run_id,
                WorkflowMutation::ConsumeReprint {
                    today: self.clock.today(),
                    user: user.to_string(),
                },
            )
            .await
            .inspect_err(|err| {
                if !matches!(err, CheckRunError::NotFound(_)) {
                    warn!(%run_id, "Reprint refused by workflow store");
                }
            })?;

        info!(
            %run_id,
            reprint_count = run.reprint_count,
            max_reprint_count = run.max_reprint_count,
            "Consumed reprint"
        );
        Ok(run)
    }

    async fn mutate(
        &self,
        run_id: CheckRunId,
        mutation: WorkflowMutation,
    ) -> Result<CheckRunWorkflow, CheckRunError> {
        self.store
            .modify(run_id, mutation, self.clock.now())
            .await?
            .ok_or_else(|| {
                warn!(%run_id, "Check run workflow not found");
                run_not_found(run_id)
            })
    }
}
