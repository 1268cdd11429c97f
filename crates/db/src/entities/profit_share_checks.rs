//! `SeaORM` Entity for profit_share_checks table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "profit_share_checks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub check_number: i64,
    pub check_run_workflow_id: Uuid,
    pub ssn: i32,
    pub demographic_id: i64,
    pub payable_name: String,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub check_amount: Decimal,
    pub tax_code_id: String,
    pub check_date: Date,
    pub check_run_date: Date,
    pub is_voided: bool,
    pub void_date: Option<Date>,
    pub bank_reference_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::check_run_workflows::Entity",
        from = "Column::CheckRunWorkflowId",
        to = "super::check_run_workflows::Column::Id"
    )]
    CheckRunWorkflows,
}

impl Related<super::check_run_workflows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckRunWorkflows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
