//! Daily statements: one ledger row per `(budget, date)` recording attributed
//! spend, fee and margin.
//!
//! Rows are insert-once. "Has this budget been charged for this date" is
//! answered by row existence, which is what makes reprocessing idempotent.
//! The engine never updates a statement; the only sanctioned mutation is the
//! campaign-scoped delete performed by an explicit reprocess.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyNano;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetDailyStatement {
    pub budget_id: Uuid,
    pub date: NaiveDate,
    pub media_spend: MoneyNano,
    pub data_spend: MoneyNano,
    pub license_fee: MoneyNano,
    pub margin: MoneyNano,
}

impl BudgetDailyStatement {
    /// Attributed media + data spend, the part counted against capacity.
    #[must_use]
    pub fn total_spend(&self) -> MoneyNano {
        self.media_spend + self.data_spend
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_daily_statements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub budget_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,
    pub media_spend_nano: i64,
    pub data_spend_nano: i64,
    pub license_fee_nano: i64,
    pub margin_nano: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Budgets,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BudgetDailyStatement> for ActiveModel {
    fn from(statement: &BudgetDailyStatement) -> Self {
        Self {
            budget_id: ActiveValue::Set(statement.budget_id),
            date: ActiveValue::Set(statement.date),
            media_spend_nano: ActiveValue::Set(statement.media_spend.nanos()),
            data_spend_nano: ActiveValue::Set(statement.data_spend.nanos()),
            license_fee_nano: ActiveValue::Set(statement.license_fee.nanos()),
            margin_nano: ActiveValue::Set(statement.margin.nanos()),
        }
    }
}

impl From<Model> for BudgetDailyStatement {
    fn from(model: Model) -> Self {
        Self {
            budget_id: model.budget_id,
            date: model.date,
            media_spend: MoneyNano::new(model.media_spend_nano),
            data_spend: MoneyNano::new(model.data_spend_nano),
            license_fee: MoneyNano::new(model.license_fee_nano),
            margin: MoneyNano::new(model.margin_nano),
        }
    }
}
