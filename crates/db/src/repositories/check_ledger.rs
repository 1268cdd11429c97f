//! Check ledger repository.
//!
//! A [`CheckLedgerScope`] here is a database transaction. Dropping it
//! without committing rolls the transaction back.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use tracing::debug;

use checkrun_core::CheckRunError;
use checkrun_core::checks::{Demographic, Distribution, ProfitShareCheck};
use checkrun_core::ports::{CheckLedger, CheckLedgerScope, DemographicReader};
use checkrun_core::workflow::{CheckRunWorkflow, WorkflowMutation};
use checkrun_shared::{CheckRunId, Ssn};

use super::{db_err, demographic, distribution, ssn_from_column, workflow};
use crate::entities::profit_share_checks;

/// Rows per `INSERT`. Each row binds 12 parameters and PostgreSQL caps a
/// statement at 65,535.
pub const INSERT_CHUNK_ROWS: usize = 1_000;

/// Issued checks and the write scope over them.
#[derive(Debug, Clone)]
pub struct CheckLedgerRepository {
    db: DatabaseConnection,
}

impl CheckLedgerRepository {
    /// Creates a new check ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(row: profit_share_checks::Model) -> Result<ProfitShareCheck, CheckRunError> {
    Ok(ProfitShareCheck {
        check_number: row.check_number,
        check_run_workflow_id: CheckRunId::from_uuid(row.check_run_workflow_id),
        ssn: ssn_from_column(row.ssn, "profit_share_checks")?,
        demographic_id: row.demographic_id,
        payable_name: row.payable_name,
        check_amount: row.check_amount,
        tax_code_id: row.tax_code_id,
        check_date: row.check_date,
        check_run_date: row.check_run_date,
        is_voided: row.is_voided,
        void_date: row.void_date,
        bank_reference_id: row.bank_reference_id,
    })
}

fn to_active_model(check: ProfitShareCheck) -> profit_share_checks::ActiveModel {
    profit_share_checks::ActiveModel {
        check_number: Set(check.check_number),
        check_run_workflow_id: Set(check.check_run_workflow_id.into_inner()),
        ssn: Set(check.ssn.value()),
        demographic_id: Set(check.demographic_id),
        payable_name: Set(check.payable_name),
        check_amount: Set(check.check_amount),
        tax_code_id: Set(check.tax_code_id),
        check_date: Set(check.check_date),
        check_run_date: Set(check.check_run_date),
        is_voided: Set(check.is_voided),
        void_date: Set(check.void_date),
        bank_reference_id: Set(check.bank_reference_id),
    }
}

#[async_trait]
impl CheckLedger for CheckLedgerRepository {
    async fn begin(&self) -> Result<Box<dyn CheckLedgerScope>, CheckRunError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Ok(Box::new(TransactionScope { txn }))
    }

    async fn checks_for_run(
        &self,
        run_id: CheckRunId,
    ) -> Result<Vec<ProfitShareCheck>, CheckRunError> {
        profit_share_checks::Entity::find()
            .filter(profit_share_checks::Column::CheckRunWorkflowId.eq(run_id.into_inner()))
            .order_by_asc(profit_share_checks::Column::CheckNumber)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_domain)
            .collect()
    }
}

/// Ledger scope backed by one database transaction.
struct TransactionScope {
    txn: DatabaseTransaction,
}

#[async_trait]
impl DemographicReader for TransactionScope {
    async fn find_by_ssns(&self, ssns: &[Ssn]) -> Result<Vec<Demographic>, CheckRunError> {
        demographic::find_by_ssns(&self.txn, ssns).await
    }
}

#[async_trait]
impl CheckLedgerScope for TransactionScope {
    async fn void_active_checks(
        &mut self,
        run_id: CheckRunId,
        void_date: NaiveDate,
    ) -> Result<u64, CheckRunError> {
        let result = profit_share_checks::Entity::update_many()
            .col_expr(profit_share_checks::Column::IsVoided, Expr::value(true))
            .col_expr(profit_share_checks::Column::VoidDate, Expr::value(void_date))
            .filter(profit_share_checks::Column::CheckRunWorkflowId.eq(run_id.into_inner()))
            .filter(profit_share_checks::Column::IsVoided.eq(false))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn modify_run(
        &mut self,
        run_id: CheckRunId,
        mutation: WorkflowMutation,
        now: DateTime<Utc>,
    ) -> Result<Option<CheckRunWorkflow>, CheckRunError> {
        workflow::modify_locked(&self.txn, run_id, &mutation, now).await
    }

    async fn load_distributions(
        &mut self,
        ids: &[i64],
    ) -> Result<Vec<Distribution>, CheckRunError> {
        distribution::load_with_payees(&self.txn, ids).await
    }

    fn demographics(&self) -> &dyn DemographicReader {
        self
    }

    async fn insert_checks(&mut self, checks: Vec<ProfitShareCheck>) -> Result<(), CheckRunError> {
        if checks.is_empty() {
            return Ok(());
        }
        let count = checks.len();
        let mut rows = checks.into_iter().map(to_active_model).peekable();
        while rows.peek().is_some() {
            let chunk: Vec<_> = rows.by_ref().take(INSERT_CHUNK_ROWS).collect();
            profit_share_checks::Entity::insert_many(chunk)
                .exec_without_returning(&self.txn)
                .await
                .map_err(db_err)?;
        }
        debug!(count, "Inserted profit share checks");
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), CheckRunError> {
        self.txn.commit().await.map_err(db_err)
    }
}
