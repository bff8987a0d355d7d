//! The batch-processing driver: selects campaigns, walks their unprocessed
//! dates and turns raw spend into statements, one day at a time.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

use crate::{
    Campaign, EngineError, RawSpend, ResultEngine, SpendSource, allocation::allocate, campaigns,
};

use super::Engine;

/// Parameters of one processing run.
///
/// `today` is passed in rather than read from a clock so the termination
/// bound is an explicit, testable input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessingRun {
    /// Inclusive lower bound; each campaign starts at
    /// `max(update_from, watermark)`.
    pub update_from: NaiveDate,
    /// Upper bound, inclusive. Processing never iterates past it.
    pub today: NaiveDate,
    /// Restrict the run to one account's campaigns.
    pub account_id: Option<Uuid>,
    /// Restrict the run to an explicit campaign set.
    pub campaign_ids: Option<Vec<Uuid>>,
}

impl ProcessingRun {
    pub fn new(update_from: NaiveDate, today: NaiveDate) -> Self {
        Self {
            update_from,
            today,
            account_id: None,
            campaign_ids: None,
        }
    }
}

/// A campaign whose processing aborted. Sibling campaigns are unaffected.
#[derive(Debug)]
pub struct CampaignFailure {
    pub campaign_id: Uuid,
    pub error: EngineError,
}

/// What one run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub campaigns_processed: u64,
    pub dates_processed: u64,
    pub statements_written: u64,
    pub statements_skipped: u64,
    pub failures: Vec<CampaignFailure>,
}

#[derive(Clone, Copy, Debug, Default)]
struct CampaignStats {
    dates: u64,
    written: u64,
    skipped: u64,
}

impl Engine {
    /// Processes every selected campaign from its effective start date up to
    /// and including `run.today`.
    ///
    /// Already-persisted dates are skipped via the ledger's conflict-ignoring
    /// insert, so overlapping runs are safe. A failing campaign is recorded
    /// in the summary and does not stop its siblings.
    pub async fn process<S: SpendSource>(
        &self,
        spend_source: &S,
        run: &ProcessingRun,
    ) -> ResultEngine<RunSummary> {
        let campaigns = self.run_campaigns(run).await?;
        let mut summary = RunSummary::default();

        for campaign in campaigns {
            match self.process_campaign(spend_source, &campaign, run).await {
                Ok(stats) => {
                    tracing::info!(
                        campaign = %campaign.id,
                        dates = stats.dates,
                        written = stats.written,
                        skipped = stats.skipped,
                        "campaign processed"
                    );
                    summary.campaigns_processed += 1;
                    summary.dates_processed += stats.dates;
                    summary.statements_written += stats.written;
                    summary.statements_skipped += stats.skipped;
                }
                Err(error) => {
                    tracing::error!(
                        campaign = %campaign.id,
                        %error,
                        "campaign processing aborted"
                    );
                    summary.failures.push(CampaignFailure {
                        campaign_id: campaign.id,
                        error,
                    });
                }
            }
        }

        Ok(summary)
    }

    /// Deletes the selected campaigns' statements from `run.update_from`
    /// onward, then processes the range again.
    ///
    /// The explicit delete is the only way existing statements change; it
    /// exists for backfills where raw spend was restated upstream.
    pub async fn reprocess<S: SpendSource>(
        &self,
        spend_source: &S,
        run: &ProcessingRun,
    ) -> ResultEngine<RunSummary> {
        for campaign in self.run_campaigns(run).await? {
            let deleted = self
                .delete_statements_from(campaign.id, run.update_from)
                .await?;
            tracing::info!(
                campaign = %campaign.id,
                deleted,
                from = %run.update_from,
                "statements cleared for reprocessing"
            );
        }
        self.process(spend_source, run).await
    }

    async fn run_campaigns(&self, run: &ProcessingRun) -> ResultEngine<Vec<Campaign>> {
        let mut query = campaigns::Entity::find();
        if let Some(account_id) = run.account_id {
            query = query.filter(campaigns::Column::AccountId.eq(account_id));
        }
        if let Some(ids) = &run.campaign_ids {
            query = query.filter(campaigns::Column::Id.is_in(ids.clone()));
        }
        let models = query.all(&self.database).await?;
        Ok(models.into_iter().map(Campaign::from).collect())
    }

    async fn process_campaign<S: SpendSource>(
        &self,
        spend_source: &S,
        campaign: &Campaign,
        run: &ProcessingRun,
    ) -> ResultEngine<CampaignStats> {
        let watermark = self
            .first_unprocessed_date(campaign.id, run.today)
            .await?;
        let mut date = run.update_from.max(watermark);
        let mut stats = CampaignStats::default();

        // Bounded walk: one day at a time, never past today.
        while date <= run.today {
            let spend_map = spend_source.campaign_spend(date, &[campaign.id]).await?;
            let spend = spend_map
                .get(&campaign.id)
                .copied()
                .unwrap_or(RawSpend::ZERO);

            let db_tx = self.database.begin().await?;
            let candidates = self.candidates_on(&db_tx, campaign.id, date).await?;
            let allocations = allocate(campaign.overspend_policy(), spend, &candidates)?;
            let outcome = self.persist_statements(&db_tx, date, &allocations).await?;
            db_tx.commit().await?;

            tracing::debug!(
                campaign = %campaign.id,
                %date,
                raw = %spend.total(),
                budgets = candidates.len(),
                written = outcome.written,
                skipped = outcome.skipped,
                "date processed"
            );

            stats.dates += 1;
            stats.written += outcome.written;
            stats.skipped += outcome.skipped;

            date = date
                .succ_opt()
                .ok_or_else(|| EngineError::InvalidWindow("date overflow".to_string()))?;
        }

        Ok(stats)
    }
}
