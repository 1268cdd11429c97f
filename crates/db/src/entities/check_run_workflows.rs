//! `SeaORM` Entity for check_run_workflows table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CheckRunStepStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "check_run_workflows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub profit_year: i32,
    pub check_run_date: Date,
    pub step_number: i32,
    pub step_status: CheckRunStepStatus,
    pub check_number: i64,
    pub reprint_count: i32,
    pub max_reprint_count: i32,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub modified_by: Option<String>,
    pub modified_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::profit_share_checks::Entity")]
    ProfitShareChecks,
}

impl Related<super::profit_share_checks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProfitShareChecks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
