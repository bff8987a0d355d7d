//! Credit line items: purchased pools of spendable currency with a fee
//! schedule.
//!
//! A credit is scoped to either an agency or an account (mutually exclusive,
//! validated by the CRUD layer that creates it). Budgets draw on a credit and
//! inherit its license fee; the engine never re-validates the scoping or the
//! budget/credit amount invariant, it trusts already-validated records.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BudgetLineItem, EngineError, MoneyNano, Rate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    Signed,
    Unsigned,
    Canceled,
}

impl CreditStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signed => "signed",
            Self::Unsigned => "unsigned",
            Self::Canceled => "canceled",
        }
    }
}

impl TryFrom<&str> for CreditStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "signed" => Ok(Self::Signed),
            "unsigned" => Ok(Self::Unsigned),
            "canceled" => Ok(Self::Canceled),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid credit status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLineItem {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub agency_id: Option<Uuid>,
    pub amount: MoneyNano,
    /// License fee fraction in `[0, 1)`.
    pub license_fee: Rate,
    /// Service fee fraction in `[0, 1)`.
    pub service_fee: Rate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: CreditStatus,
}

impl CreditLineItem {
    /// Returns `true` if the validity window contains `date`.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Fee and margin rules for one budget/credit pair, resolved once per
/// allocation instead of branched inline.
///
/// The license fee always comes from the credit. The margin is the budget's
/// fixed override when set; margin derived from account-level settings is an
/// external concern, so absent an override the margin is zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeSchedule {
    pub license_fee: Rate,
    pub margin: Rate,
}

impl FeeSchedule {
    #[must_use]
    pub fn resolve(credit: &CreditLineItem, budget: &BudgetLineItem) -> FeeSchedule {
        FeeSchedule {
            license_fee: credit.license_fee,
            margin: budget.margin.unwrap_or(Rate::ZERO),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub agency_id: Option<Uuid>,
    pub amount_nano: i64,
    pub license_fee_ppb: i64,
    pub service_fee_ppb: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CreditLineItem> for ActiveModel {
    fn from(credit: &CreditLineItem) -> Self {
        Self {
            id: ActiveValue::Set(credit.id),
            account_id: ActiveValue::Set(credit.account_id),
            agency_id: ActiveValue::Set(credit.agency_id),
            amount_nano: ActiveValue::Set(credit.amount.nanos()),
            license_fee_ppb: ActiveValue::Set(credit.license_fee.ppb() as i64),
            service_fee_ppb: ActiveValue::Set(credit.service_fee.ppb() as i64),
            start_date: ActiveValue::Set(credit.start_date),
            end_date: ActiveValue::Set(credit.end_date),
            status: ActiveValue::Set(credit.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for CreditLineItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            account_id: model.account_id,
            agency_id: model.agency_id,
            amount: MoneyNano::new(model.amount_nano),
            license_fee: fee_fraction(model.license_fee_ppb, "license fee")?,
            service_fee: fee_fraction(model.service_fee_ppb, "service fee")?,
            start_date: model.start_date,
            end_date: model.end_date,
            status: CreditStatus::try_from(model.status.as_str())?,
        })
    }
}

/// Fee fractions live in `[0, 1)`: a credit charging 100% or more of its
/// spend as fees is malformed.
fn fee_fraction(ppb: i64, label: &str) -> Result<Rate, EngineError> {
    let rate = Rate::from_ppb(ppb)
        .map_err(|_| EngineError::InvalidRate(format!("invalid {label}: {ppb} ppb")))?;
    if rate >= Rate::ONE {
        return Err(EngineError::InvalidRate(format!(
            "invalid {label}: {ppb} ppb"
        )));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit(license_fee: Rate) -> CreditLineItem {
        CreditLineItem {
            id: Uuid::new_v4(),
            account_id: Some(Uuid::new_v4()),
            agency_id: None,
            amount: MoneyNano::new(1_000_000),
            license_fee,
            service_fee: Rate::ZERO,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            status: CreditStatus::Signed,
        }
    }

    fn budget_with_margin(credit_id: Uuid, margin: Option<Rate>) -> BudgetLineItem {
        BudgetLineItem {
            id: Uuid::new_v4(),
            credit_id,
            campaign_id: Uuid::new_v4(),
            amount: MoneyNano::new(1_000_000),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            margin,
            sequence_number: 1,
        }
    }

    #[test]
    fn fee_schedule_uses_budget_margin_override() {
        let credit = credit(Rate::from_ppb(200_000_000).unwrap());
        let margin = Rate::from_ppb(150_000_000).unwrap();
        let budget = budget_with_margin(credit.id, Some(margin));

        let fees = FeeSchedule::resolve(&credit, &budget);
        assert_eq!(fees.license_fee, credit.license_fee);
        assert_eq!(fees.margin, margin);
    }

    #[test]
    fn fee_schedule_defaults_margin_to_zero() {
        let credit = credit(Rate::from_ppb(200_000_000).unwrap());
        let budget = budget_with_margin(credit.id, None);

        let fees = FeeSchedule::resolve(&credit, &budget);
        assert_eq!(fees.margin, Rate::ZERO);
    }

    #[test]
    fn model_round_trip_rejects_full_fee() {
        let mut model = Model {
            id: Uuid::new_v4(),
            account_id: Some(Uuid::new_v4()),
            agency_id: None,
            amount_nano: 100,
            license_fee_ppb: 1_000_000_000,
            service_fee_ppb: 0,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            status: "signed".to_string(),
        };
        assert!(CreditLineItem::try_from(model.clone()).is_err());

        model.license_fee_ppb = 200_000_000;
        let credit = CreditLineItem::try_from(model).unwrap();
        assert_eq!(credit.license_fee.ppb(), 200_000_000);
        assert_eq!(credit.status, CreditStatus::Signed);
    }
}
