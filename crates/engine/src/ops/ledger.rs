//! Statement persistence and the per-campaign processing watermark.

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    Allocation, BudgetDailyStatement, EngineError, ResultEngine, budgets, campaigns, statements,
};

use super::Engine;

/// Outcome of persisting one date's allocations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PersistOutcome {
    pub written: u64,
    pub skipped: u64,
}

impl Engine {
    /// Inserts one statement row per allocation, skipping `(budget, date)`
    /// pairs that already have one.
    ///
    /// The conflict-ignoring insert is the idempotence mechanism: re-running
    /// a pass over a processed date is a no-op, and a concurrent insert of
    /// the same pair counts as already processed, not as an error.
    pub(crate) async fn persist_statements<C: ConnectionTrait>(
        &self,
        db: &C,
        date: NaiveDate,
        allocations: &[Allocation],
    ) -> ResultEngine<PersistOutcome> {
        let mut outcome = PersistOutcome::default();
        for allocation in allocations {
            let model = statements::ActiveModel {
                budget_id: ActiveValue::Set(allocation.budget_id),
                date: ActiveValue::Set(date),
                media_spend_nano: ActiveValue::Set(allocation.media_spend.nanos()),
                data_spend_nano: ActiveValue::Set(allocation.data_spend.nanos()),
                license_fee_nano: ActiveValue::Set(allocation.license_fee.nanos()),
                margin_nano: ActiveValue::Set(allocation.margin.nanos()),
            };
            let inserted = statements::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([statements::Column::BudgetId, statements::Column::Date])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(db)
                .await?;
            if inserted == 0 {
                outcome.skipped += 1;
            } else {
                outcome.written += 1;
            }
        }
        Ok(outcome)
    }

    /// First date not yet processed for a campaign, clamped to `today`.
    ///
    /// The watermark is the day after the latest statement across the
    /// campaign's budgets; with no statements it falls back to the earliest
    /// budget start date, and with no budgets to the campaign's creation
    /// date. It never points past `today`; there is no forward processing.
    pub async fn first_unprocessed_date(
        &self,
        campaign_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<NaiveDate> {
        self.watermark_on(&self.database, campaign_id, today).await
    }

    pub(crate) async fn watermark_on<C: ConnectionTrait>(
        &self,
        db: &C,
        campaign_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<NaiveDate> {
        let last_statement: Option<NaiveDate> = statements::Entity::find()
            .select_only()
            .column_as(statements::Column::Date.max(), "last_date")
            .join(JoinType::InnerJoin, statements::Relation::Budgets.def())
            .filter(budgets::Column::CampaignId.eq(campaign_id))
            .into_tuple()
            .one(db)
            .await?
            .flatten();

        let watermark = match last_statement {
            Some(last) => last
                .succ_opt()
                .ok_or_else(|| EngineError::InvalidWindow("date overflow".to_string()))?,
            None => {
                let first_budget: Option<NaiveDate> = budgets::Entity::find()
                    .select_only()
                    .column_as(budgets::Column::StartDate.min(), "first_start")
                    .filter(budgets::Column::CampaignId.eq(campaign_id))
                    .into_tuple()
                    .one(db)
                    .await?
                    .flatten();
                match first_budget {
                    Some(start) => start,
                    None => {
                        let campaign = campaigns::Entity::find_by_id(campaign_id)
                            .one(db)
                            .await?
                            .ok_or_else(|| {
                                EngineError::KeyNotFound(campaign_id.to_string())
                            })?;
                        campaign.created_at
                    }
                }
            }
        };

        Ok(watermark.min(today))
    }

    /// Statements attributed to a campaign's budgets in `[from, to]`, oldest
    /// first. This is the read surface the downstream materialization
    /// pipeline consumes alongside the effective-spend factors.
    pub async fn statements_for_campaign(
        &self,
        campaign_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<BudgetDailyStatement>> {
        let models = statements::Entity::find()
            .join(JoinType::InnerJoin, statements::Relation::Budgets.def())
            .filter(budgets::Column::CampaignId.eq(campaign_id))
            .filter(statements::Column::Date.gte(from))
            .filter(statements::Column::Date.lte(to))
            .order_by_asc(statements::Column::Date)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(BudgetDailyStatement::from).collect())
    }

    /// Deletes a campaign's statements from `from` onward.
    ///
    /// This is the delete-and-regenerate path used by an explicit reprocess;
    /// a normal run never deletes or updates rows. Returns the number of
    /// deleted rows.
    pub async fn delete_statements_from(
        &self,
        campaign_id: Uuid,
        from: NaiveDate,
    ) -> ResultEngine<u64> {
        let budget_ids: Vec<Uuid> = budgets::Entity::find()
            .select_only()
            .column(budgets::Column::Id)
            .filter(budgets::Column::CampaignId.eq(campaign_id))
            .into_tuple()
            .all(&self.database)
            .await?;
        if budget_ids.is_empty() {
            return Ok(0);
        }

        let result = statements::Entity::delete_many()
            .filter(statements::Column::BudgetId.is_in(budget_ids))
            .filter(statements::Column::Date.gte(from))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }
}
