//! Budget resolution: the ordered, date-filtered candidate set for one
//! campaign and date.

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Statement,
};
use uuid::Uuid;

use crate::{
    BudgetCandidate, BudgetLineItem, CreditLineItem, EngineError, MoneyNano, ResultEngine,
    budgets, credits,
};

use super::Engine;

impl Engine {
    /// Returns the candidate budgets for `campaign_id` on `date`, in
    /// waterfall order.
    ///
    /// Candidates are the budgets whose validity window contains `date`,
    /// ordered ascending by sequence number, each paired with its credit and
    /// its lifetime remaining capacity (amount minus every statement already
    /// attributed to it, across all dates, clipped at zero).
    pub async fn resolve_candidates(
        &self,
        campaign_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Vec<BudgetCandidate>> {
        self.candidates_on(&self.database, campaign_id, date).await
    }

    pub(crate) async fn candidates_on<C: ConnectionTrait>(
        &self,
        db: &C,
        campaign_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<Vec<BudgetCandidate>> {
        let budget_models = budgets::Entity::find()
            .filter(budgets::Column::CampaignId.eq(campaign_id))
            .filter(budgets::Column::StartDate.lte(date))
            .filter(budgets::Column::EndDate.gte(date))
            .order_by_asc(budgets::Column::SequenceNumber)
            .all(db)
            .await?;

        let mut candidates = Vec::with_capacity(budget_models.len());
        for model in budget_models {
            let budget = BudgetLineItem::try_from(model)?;
            let credit_model = credits::Entity::find_by_id(budget.credit_id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::MissingCredit(budget.credit_id.to_string()))?;
            let credit = CreditLineItem::try_from(credit_model)?;

            let spent = lifetime_spend(db, budget.id).await?;
            let remaining = budget.amount.sub_or_zero(spent);
            candidates.push(BudgetCandidate {
                budget,
                credit,
                remaining,
            });
        }
        Ok(candidates)
    }
}

/// Media + data spend already attributed to a budget across all dates.
async fn lifetime_spend<C: ConnectionTrait>(db: &C, budget_id: Uuid) -> ResultEngine<MoneyNano> {
    let stmt = Statement::from_sql_and_values(
        db.get_database_backend(),
        "SELECT COALESCE(SUM(media_spend_nano + data_spend_nano), 0) AS sum \
         FROM budget_daily_statements \
         WHERE budget_id = ?",
        vec![budget_id.into()],
    );
    let row = db.query_one(stmt).await?;
    let spent: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
    Ok(MoneyNano::new(spent))
}
