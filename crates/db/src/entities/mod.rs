//! `SeaORM` entities.
//!
//! `check_run_workflows` and `profit_share_checks` are owned by the check
//! run. The rest are read-only views of tables owned by the wider
//! application.

pub mod prelude;

pub mod check_run_workflows;
pub mod demographics;
pub mod distribution_payees;
pub mod distributions;
pub mod profit_share_checks;
pub mod sea_orm_active_enums;
