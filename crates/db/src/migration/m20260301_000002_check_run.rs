//! Check run schema.
//!
//! Creates the check number sequence, the workflow table and the check
//! ledger. The partial unique index on `check_run_workflows` is what makes
//! "one active run per profit year" hold under concurrent writers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(CHECK_RUN_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS profit_share_checks CASCADE;
             DROP TABLE IF EXISTS check_run_workflows CASCADE;
             DROP TYPE IF EXISTS check_run_step_status;
             DROP SEQUENCE IF EXISTS profit_share_check_number_seq;",
        )
        .await?;
        Ok(())
    }
}

const CHECK_RUN_SQL: &str = r"
-- Only source of check numbers. Never reset: numbers are burned, not reused.
CREATE SEQUENCE profit_share_check_number_seq AS BIGINT START WITH 1 INCREMENT BY 1 NO CYCLE;

CREATE TYPE check_run_step_status AS ENUM ('pending', 'completed');

CREATE TABLE check_run_workflows (
    id UUID PRIMARY KEY,
    profit_year INTEGER NOT NULL,
    check_run_date DATE NOT NULL,
    step_number INTEGER NOT NULL DEFAULT 1,
    step_status check_run_step_status NOT NULL DEFAULT 'pending',
    check_number BIGINT NOT NULL,
    reprint_count INTEGER NOT NULL DEFAULT 0,
    max_reprint_count INTEGER NOT NULL,
    created_by VARCHAR(128) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    modified_by VARCHAR(128),
    modified_at TIMESTAMPTZ,
    CONSTRAINT chk_step_number CHECK (step_number >= 1),
    CONSTRAINT chk_reprint_count CHECK (reprint_count >= 0),
    CONSTRAINT chk_max_reprint_count CHECK (max_reprint_count >= 0)
);

-- At most one active run per profit year
CREATE UNIQUE INDEX uq_check_run_workflows_active_year
    ON check_run_workflows(profit_year)
    WHERE step_status <> 'completed';

CREATE TABLE profit_share_checks (
    check_number BIGINT PRIMARY KEY,
    check_run_workflow_id UUID NOT NULL REFERENCES check_run_workflows(id),
    ssn INTEGER NOT NULL,
    demographic_id BIGINT NOT NULL,
    payable_name VARCHAR(84) NOT NULL,
    check_amount NUMERIC(18, 2) NOT NULL,
    tax_code_id VARCHAR(8) NOT NULL,
    check_date DATE NOT NULL,
    check_run_date DATE NOT NULL,
    is_voided BOOLEAN NOT NULL DEFAULT false,
    void_date DATE,
    bank_reference_id BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_void_date CHECK (is_voided OR void_date IS NULL)
);

-- Live checks of a run (reprint voiding)
CREATE INDEX idx_profit_share_checks_live
    ON profit_share_checks(check_run_workflow_id)
    WHERE is_voided = false;
";
