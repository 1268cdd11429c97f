//! Check number sequence.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement};

use checkrun_core::CheckRunError;
use checkrun_core::ports::CheckNumberSequence;

use super::db_err;

const NEXT_VALUES_SQL: &str =
    "SELECT nextval('profit_share_check_number_seq') AS value FROM generate_series(1, $1)";

#[derive(Debug, FromQueryResult)]
struct NextValue {
    value: i64,
}

/// Draws check numbers from `profit_share_check_number_seq`.
#[derive(Debug, Clone)]
pub struct CheckNumberRepository {
    db: DatabaseConnection,
}

impl CheckNumberRepository {
    /// Creates a new check number repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CheckNumberSequence for CheckNumberRepository {
    async fn next_values(&self, count: usize) -> Result<Vec<i64>, CheckRunError> {
        let count = i64::try_from(count)
            .map_err(|_| CheckRunError::Unexpected("Check number batch too large.".to_string()))?;

        let rows = NextValue::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            NEXT_VALUES_SQL,
            [count.into()],
        ))
        .all(&self.db)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(|row| row.value).collect())
    }
}
