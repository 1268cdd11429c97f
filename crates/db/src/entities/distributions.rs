//! `SeaORM` Entity for distributions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "distributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub ssn: i32,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub gross_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub federal_tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub state_tax_amount: Decimal,
    pub employee_name: Option<String>,
    pub payee_id: Option<i64>,
    pub tax_code_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::distribution_payees::Entity",
        from = "Column::PayeeId",
        to = "super::distribution_payees::Column::Id"
    )]
    DistributionPayees,
}

impl Related<super::distribution_payees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DistributionPayees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
