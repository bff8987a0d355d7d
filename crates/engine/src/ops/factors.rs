//! Effective-spend factors: per-campaign per-date ratios derived from the
//! ledger, consumed by the downstream materialization pipeline to prorate
//! granular raw rows.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

use crate::{MoneyNano, Rate, ResultEngine, SpendSource};

use super::Engine;

/// Ratios for one campaign/date.
///
/// `actual_spend` is statement spend over raw spend: at most one (statements
/// never exceed raw spend), exactly one when a manual campaign attributed
/// everything. `license_fee` and `margin` are fee and margin sums over
/// statement spend. Each ratio is zero when its denominator is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectiveSpendFactors {
    pub actual_spend: Rate,
    pub license_fee: Rate,
    pub margin: Rate,
}

#[derive(Clone, Copy, Debug, Default)]
struct StatementTotals {
    spend: MoneyNano,
    license_fee: MoneyNano,
    margin: MoneyNano,
}

impl Engine {
    /// Computes effective-spend factors for the given campaigns and dates.
    ///
    /// Raw spend is fetched again from the spend source; statements come
    /// from the ledger. Dates with neither raw spend nor statements yield
    /// all-zero factors.
    pub async fn effective_spend<S: SpendSource>(
        &self,
        spend_source: &S,
        campaign_ids: &[Uuid],
        dates: &[NaiveDate],
    ) -> ResultEngine<HashMap<NaiveDate, HashMap<Uuid, EffectiveSpendFactors>>> {
        let mut factors_by_date = HashMap::with_capacity(dates.len());

        for &date in dates {
            let raw = spend_source.campaign_spend(date, campaign_ids).await?;
            let mut by_campaign = HashMap::with_capacity(campaign_ids.len());

            for &campaign_id in campaign_ids {
                let totals = self.statement_totals(campaign_id, date).await?;
                let raw_total = raw.get(&campaign_id).map_or(MoneyNano::ZERO, |s| s.total());
                by_campaign.insert(campaign_id, derive_factors(totals, raw_total)?);
            }
            factors_by_date.insert(date, by_campaign);
        }

        Ok(factors_by_date)
    }

    async fn statement_totals(
        &self,
        campaign_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<StatementTotals> {
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT COALESCE(SUM(s.media_spend_nano + s.data_spend_nano), 0) AS spend, \
                    COALESCE(SUM(s.license_fee_nano), 0) AS license_fee, \
                    COALESCE(SUM(s.margin_nano), 0) AS margin \
             FROM budget_daily_statements s \
             INNER JOIN budget_line_items b ON s.budget_id = b.id \
             WHERE b.campaign_id = ? AND s.date = ?",
            vec![campaign_id.into(), date.into()],
        );
        let row = self.database.query_one(stmt).await?;
        let Some(row) = row else {
            return Ok(StatementTotals::default());
        };
        Ok(StatementTotals {
            spend: MoneyNano::new(row.try_get("", "spend").unwrap_or(0)),
            license_fee: MoneyNano::new(row.try_get("", "license_fee").unwrap_or(0)),
            margin: MoneyNano::new(row.try_get("", "margin").unwrap_or(0)),
        })
    }
}

fn derive_factors(
    totals: StatementTotals,
    raw_total: MoneyNano,
) -> ResultEngine<EffectiveSpendFactors> {
    let actual_spend = if raw_total.is_zero() {
        Rate::ZERO
    } else {
        Rate::from_ratio(totals.spend, raw_total)?
    };
    let license_fee = if totals.spend.is_zero() {
        Rate::ZERO
    } else {
        Rate::from_ratio(totals.license_fee, totals.spend)?
    };
    let margin = if totals.spend.is_zero() {
        Rate::ZERO
    } else {
        Rate::from_ratio(totals.margin, totals.spend)?
    };
    Ok(EffectiveSpendFactors {
        actual_spend,
        license_fee,
        margin,
    })
}
