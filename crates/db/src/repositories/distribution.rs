//! Distribution reads.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
};

use checkrun_core::CheckRunError;
use checkrun_core::checks::Distribution;
use checkrun_core::ports::DistributionReader;

use super::{IN_LIST_CHUNK, db_err, ssn_from_column};
use crate::entities::{distribution_payees, distributions};

/// Read-only access to distributions.
#[derive(Debug, Clone)]
pub struct DistributionRepository {
    db: DatabaseConnection,
}

impl DistributionRepository {
    /// Creates a new distribution repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DistributionReader for DistributionRepository {
    async fn find_existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, CheckRunError> {
        let mut found = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IN_LIST_CHUNK) {
            let existing: Vec<i64> = distributions::Entity::find()
                .select_only()
                .column(distributions::Column::Id)
                .filter(distributions::Column::Id.is_in(chunk.iter().copied()))
                .into_tuple::<i64>()
                .all(&self.db)
                .await
                .map_err(db_err)?;
            found.extend(existing);
        }
        Ok(found)
    }
}

fn to_domain(
    row: distributions::Model,
    payee: Option<distribution_payees::Model>,
) -> Result<Distribution, CheckRunError> {
    Ok(Distribution {
        id: row.id,
        ssn: ssn_from_column(row.ssn, "distributions")?,
        gross_amount: row.gross_amount,
        federal_tax_amount: row.federal_tax_amount,
        state_tax_amount: row.state_tax_amount,
        employee_name: row.employee_name,
        payee_name: payee.and_then(|p| p.name),
        tax_code_id: row.tax_code_id,
    })
}

/// Loads distributions with their payee names on `conn`.
pub(crate) async fn load_with_payees<C: ConnectionTrait>(
    conn: &C,
    ids: &[i64],
) -> Result<Vec<Distribution>, CheckRunError> {
    let mut loaded = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(IN_LIST_CHUNK) {
        let rows = distributions::Entity::find()
            .filter(distributions::Column::Id.is_in(chunk.iter().copied()))
            .find_also_related(distribution_payees::Entity)
            .all(conn)
            .await
            .map_err(db_err)?;
        for (row, payee) in rows {
            loaded.push(to_domain(row, payee)?);
        }
    }
    loaded.sort_by_key(|d| d.id);
    Ok(loaded)
}
