//! Identity record reads.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use checkrun_core::CheckRunError;
use checkrun_core::checks::Demographic;
use checkrun_core::ports::DemographicReader;
use checkrun_shared::Ssn;

use super::{IN_LIST_CHUNK, db_err, ssn_from_column};
use crate::entities::demographics;

/// Read-only access to identity records.
#[derive(Debug, Clone)]
pub struct DemographicRepository {
    db: DatabaseConnection,
}

impl DemographicRepository {
    /// Creates a new demographic repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DemographicReader for DemographicRepository {
    async fn find_by_ssns(&self, ssns: &[Ssn]) -> Result<Vec<Demographic>, CheckRunError> {
        find_by_ssns(&self.db, ssns).await
    }
}

fn to_domain(row: demographics::Model) -> Result<Demographic, CheckRunError> {
    Ok(Demographic {
        id: row.id,
        ssn: ssn_from_column(row.ssn, "demographics")?,
        badge_number: row.badge_number,
        external_id: row.external_id,
        created_at_utc: row.created_at_utc.with_timezone(&Utc),
        modified_at_utc: row.modified_at_utc.map(|at| at.with_timezone(&Utc)),
    })
}

/// Every identity row whose SSN is in `ssns`, read on `conn`.
pub(crate) async fn find_by_ssns<C: ConnectionTrait>(
    conn: &C,
    ssns: &[Ssn],
) -> Result<Vec<Demographic>, CheckRunError> {
    let mut found = Vec::with_capacity(ssns.len());
    for chunk in ssns.chunks(IN_LIST_CHUNK) {
        let rows = demographics::Entity::find()
            .filter(demographics::Column::Ssn.is_in(chunk.iter().map(|ssn| ssn.value())))
            .all(conn)
            .await
            .map_err(db_err)?;
        for row in rows {
            found.push(to_domain(row)?);
        }
    }
    Ok(found)
}
