//! Distribution and identity tables.
//!
//! These tables belong to the wider profit-sharing application. They are
//! created with `IF NOT EXISTS` so the check run schema can be applied next
//! to an existing database as well as to an empty one.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SOURCE_TABLES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS distributions CASCADE;
             DROP TABLE IF EXISTS distribution_payees CASCADE;
             DROP TABLE IF EXISTS demographics CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const SOURCE_TABLES_SQL: &str = r"
CREATE TABLE IF NOT EXISTS distribution_payees (
    id BIGINT PRIMARY KEY,
    name VARCHAR(128)
);

CREATE TABLE IF NOT EXISTS distributions (
    id BIGINT PRIMARY KEY,
    ssn INTEGER NOT NULL,
    gross_amount NUMERIC(18, 4) NOT NULL,
    federal_tax_amount NUMERIC(18, 4) NOT NULL DEFAULT 0,
    state_tax_amount NUMERIC(18, 4) NOT NULL DEFAULT 0,
    employee_name VARCHAR(128),
    payee_id BIGINT REFERENCES distribution_payees(id),
    tax_code_id VARCHAR(8) NOT NULL,
    CONSTRAINT chk_distributions_ssn CHECK (ssn BETWEEN 0 AND 999999999)
);

CREATE INDEX IF NOT EXISTS idx_distributions_ssn ON distributions(ssn);

CREATE TABLE IF NOT EXISTS demographics (
    id BIGINT PRIMARY KEY,
    ssn INTEGER NOT NULL,
    badge_number INTEGER NOT NULL,
    external_id BIGINT,
    created_at_utc TIMESTAMPTZ NOT NULL DEFAULT now(),
    modified_at_utc TIMESTAMPTZ,
    CONSTRAINT chk_demographics_ssn CHECK (ssn BETWEEN 0 AND 999999999)
);

CREATE INDEX IF NOT EXISTS idx_demographics_ssn ON demographics(ssn);
";
