//! Budget line items: campaign-scoped slices of a credit, consumed by the
//! waterfall in creation order.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyNano, Rate};

/// State of a budget at a probe date, derived from the validity window and
/// remaining capacity. Never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetState {
    Active,
    Pending,
    Inactive,
    Depleted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLineItem {
    pub id: Uuid,
    pub credit_id: Uuid,
    pub campaign_id: Uuid,
    pub amount: MoneyNano,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Fixed margin override. When absent the margin is zero; margins
    /// derived from account settings are resolved outside the engine.
    pub margin: Option<Rate>,
    /// Waterfall precedence: immutable, unique, assigned at creation.
    /// Candidates are consumed in ascending order, so older budgets are
    /// exhausted before newer ones regardless of window overlap.
    pub sequence_number: i64,
}

impl BudgetLineItem {
    /// Returns `true` if the validity window contains `date`.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Derives the budget state at `date` given its remaining capacity.
    #[must_use]
    pub fn state(&self, date: NaiveDate, remaining: MoneyNano) -> BudgetState {
        if date < self.start_date {
            BudgetState::Pending
        } else if date > self.end_date {
            BudgetState::Inactive
        } else if remaining.is_zero() {
            BudgetState::Depleted
        } else {
            BudgetState::Active
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub credit_id: Uuid,
    pub campaign_id: Uuid,
    pub amount_nano: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub margin_ppb: Option<i64>,
    pub sequence_number: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credits::Entity",
        from = "Column::CreditId",
        to = "super::credits::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Credits,
    #[sea_orm(
        belongs_to = "super::campaigns::Entity",
        from = "Column::CampaignId",
        to = "super::campaigns::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Campaigns,
    #[sea_orm(has_many = "super::statements::Entity")]
    Statements,
}

impl Related<super::credits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credits.def()
    }
}

impl Related<super::campaigns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaigns.def()
    }
}

impl Related<super::statements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BudgetLineItem> for ActiveModel {
    fn from(budget: &BudgetLineItem) -> Self {
        Self {
            id: ActiveValue::Set(budget.id),
            credit_id: ActiveValue::Set(budget.credit_id),
            campaign_id: ActiveValue::Set(budget.campaign_id),
            amount_nano: ActiveValue::Set(budget.amount.nanos()),
            start_date: ActiveValue::Set(budget.start_date),
            end_date: ActiveValue::Set(budget.end_date),
            margin_ppb: ActiveValue::Set(budget.margin.map(|rate| rate.ppb() as i64)),
            sequence_number: ActiveValue::Set(budget.sequence_number),
        }
    }
}

impl TryFrom<Model> for BudgetLineItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let margin = model
            .margin_ppb
            .map(|ppb| {
                Rate::from_ppb(ppb)
                    .map_err(|_| EngineError::InvalidRate(format!("invalid margin: {ppb} ppb")))
            })
            .transpose()?;
        Ok(Self {
            id: model.id,
            credit_id: model.credit_id,
            campaign_id: model.campaign_id,
            amount: MoneyNano::new(model.amount_nano),
            start_date: model.start_date,
            end_date: model.end_date,
            margin,
            sequence_number: model.sequence_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> BudgetLineItem {
        BudgetLineItem {
            id: Uuid::new_v4(),
            credit_id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            amount: MoneyNano::new(10_000),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
            margin: None,
            sequence_number: 1,
        }
    }

    #[test]
    fn covers_is_inclusive_on_both_ends() {
        let budget = budget();
        assert!(budget.covers(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()));
        assert!(budget.covers(NaiveDate::from_ymd_opt(2026, 3, 20).unwrap()));
        assert!(!budget.covers(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()));
        assert!(!budget.covers(NaiveDate::from_ymd_opt(2026, 3, 21).unwrap()));
    }

    #[test]
    fn state_derivation() {
        let budget = budget();
        let inside = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

        assert_eq!(
            budget.state(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), budget.amount),
            BudgetState::Pending
        );
        assert_eq!(
            budget.state(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(), budget.amount),
            BudgetState::Inactive
        );
        assert_eq!(budget.state(inside, budget.amount), BudgetState::Active);
        assert_eq!(budget.state(inside, MoneyNano::ZERO), BudgetState::Depleted);
    }
}
