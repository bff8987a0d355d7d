//! Campaign reference data consumed by the processing driver.
//!
//! Campaign CRUD lives outside the engine; this module models the attributes
//! the driver needs: the overspend policy switch, the account used for run
//! filtering, and the creation date used as the watermark fallback.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::allocation::OverspendPolicy;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    /// Automatic-stop setting: when enabled, attributed spend is capped at
    /// the total remaining capacity of the campaign's budgets.
    pub automatic_stop: bool,
    pub created_at: NaiveDate,
}

impl Campaign {
    pub fn new(
        account_id: Uuid,
        name: String,
        automatic_stop: bool,
        created_at: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            name,
            automatic_stop,
            created_at,
        }
    }

    /// Overspend policy derived from the automatic-stop setting.
    #[must_use]
    pub fn overspend_policy(&self) -> OverspendPolicy {
        if self.automatic_stop {
            OverspendPolicy::AutomaticStop
        } else {
            OverspendPolicy::Manual
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub automatic_stop: bool,
    pub created_at: Date,
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

impl From<&Campaign> for ActiveModel {
    fn from(campaign: &Campaign) -> Self {
        Self {
            id: ActiveValue::Set(campaign.id),
            account_id: ActiveValue::Set(campaign.account_id),
            name: ActiveValue::Set(campaign.name.clone()),
            automatic_stop: ActiveValue::Set(campaign.automatic_stop),
            created_at: ActiveValue::Set(campaign.created_at),
        }
    }
}

impl From<Model> for Campaign {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            name: model.name,
            automatic_stop: model.automatic_stop,
            created_at: model.created_at,
        }
    }
}
