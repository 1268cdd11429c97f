//! Workflow repository for check run state transitions.
//!
//! The transition rules live in `checkrun-core`; this repository only makes
//! them atomic. Every mutation reads the row `FOR UPDATE`, applies the core
//! mutation and writes the result back in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::warn;

use checkrun_core::CheckRunError;
use checkrun_core::ports::WorkflowStore;
use checkrun_core::workflow::{CheckRunWorkflow, StepStatus, WorkflowMutation};
use checkrun_shared::CheckRunId;

use super::db_err;
use crate::entities::{check_run_workflows, sea_orm_active_enums::CheckRunStepStatus};

/// Persists check run workflows.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Convert DB status to core status.
const fn db_status_to_core(status: CheckRunStepStatus) -> StepStatus {
    match status {
        CheckRunStepStatus::Pending => StepStatus::Pending,
        CheckRunStepStatus::Completed => StepStatus::Completed,
    }
}

/// Convert core status to DB status.
const fn core_status_to_db(status: StepStatus) -> CheckRunStepStatus {
    match status {
        StepStatus::Pending => CheckRunStepStatus::Pending,
        StepStatus::Completed => CheckRunStepStatus::Completed,
    }
}

fn to_domain(row: check_run_workflows::Model) -> CheckRunWorkflow {
    CheckRunWorkflow {
        id: CheckRunId::from_uuid(row.id),
        profit_year: row.profit_year,
        check_run_date: row.check_run_date,
        step_number: row.step_number,
        step_status: db_status_to_core(row.step_status),
        check_number: row.check_number,
        reprint_count: row.reprint_count,
        max_reprint_count: row.max_reprint_count,
        created_by: row.created_by,
        created_at: row.created_at.with_timezone(&Utc),
        modified_by: row.modified_by,
        modified_at: row.modified_at.map(|at| at.with_timezone(&Utc)),
    }
}

fn insert_err(err: DbErr, profit_year: i32) -> CheckRunError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        warn!(profit_year, "Active check run workflow already exists");
        return CheckRunError::RunAlreadyActive { profit_year };
    }
    db_err(err)
}

/// Applies `mutation` to the locked row `id` on `conn`.
///
/// `conn` must be a transaction for the lock to mean anything.
pub(crate) async fn modify_locked<C: ConnectionTrait>(
    conn: &C,
    id: CheckRunId,
    mutation: &WorkflowMutation,
    now: DateTime<Utc>,
) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
    let Some(row) = check_run_workflows::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(db_err)?
    else {
        return Ok(None);
    };

    let mut run = to_domain(row.clone());
    run.apply(mutation, now)?;

    let mut active: check_run_workflows::ActiveModel = row.into();
    active.step_number = Set(run.step_number);
    active.step_status = Set(core_status_to_db(run.step_status));
    active.check_number = Set(run.check_number);
    active.reprint_count = Set(run.reprint_count);
    active.modified_by = Set(run.modified_by.clone());
    active.modified_at = Set(run.modified_at.map(Into::into));
    active.update(conn).await.map_err(db_err)?;

    Ok(Some(run))
}

#[async_trait]
impl WorkflowStore for WorkflowRepository {
    async fn find_active(
        &self,
        profit_year: i32,
    ) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
        let row = check_run_workflows::Entity::find()
            .filter(check_run_workflows::Column::ProfitYear.eq(profit_year))
            .filter(check_run_workflows::Column::StepStatus.ne(CheckRunStepStatus::Completed))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(to_domain))
    }

    async fn find(&self, id: CheckRunId) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
        let row = check_run_workflows::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(to_domain))
    }

    async fn insert(&self, run: CheckRunWorkflow) -> Result<CheckRunWorkflow, CheckRunError> {
        let profit_year = run.profit_year;
        let active = check_run_workflows::ActiveModel {
            id: Set(run.id.into_inner()),
            profit_year: Set(run.profit_year),
            check_run_date: Set(run.check_run_date),
            step_number: Set(run.step_number),
            step_status: Set(core_status_to_db(run.step_status)),
            check_number: Set(run.check_number),
            reprint_count: Set(run.reprint_count),
            max_reprint_count: Set(run.max_reprint_count),
            created_by: Set(run.created_by),
            created_at: Set(run.created_at.into()),
            modified_by: Set(run.modified_by),
            modified_at: Set(run.modified_at.map(Into::into)),
        };

        let row = active
            .insert(&self.db)
            .await
            .map_err(|e| insert_err(e, profit_year))?;
        Ok(to_domain(row))
    }

    async fn modify(
        &self,
        id: CheckRunId,
        mutation: WorkflowMutation,
        now: DateTime<Utc>,
    ) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let run = modify_locked(&txn, id, &mutation, now).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(run)
    }
}

