use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    BudgetLineItem, Campaign, CreditLineItem, CreditStatus, Engine, EngineError, MoneyNano,
    ProcessingRun, Rate, RawSpend, SpendSource, budgets, campaigns, credits,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_campaign(db: &DatabaseConnection, automatic_stop: bool) -> Campaign {
    let campaign = Campaign::new(
        Uuid::new_v4(),
        "Always-on".to_string(),
        automatic_stop,
        date(2026, 2, 20),
    );
    campaigns::ActiveModel::from(&campaign)
        .insert(db)
        .await
        .unwrap();
    campaign
}

async fn seed_funded_budget(
    db: &DatabaseConnection,
    campaign: &Campaign,
    amount: i64,
    license_fee_ppb: i64,
    margin_ppb: Option<i64>,
    sequence_number: i64,
) -> BudgetLineItem {
    let credit = CreditLineItem {
        id: Uuid::new_v4(),
        account_id: Some(campaign.account_id),
        agency_id: None,
        amount: MoneyNano::new(amount),
        license_fee: Rate::from_ppb(license_fee_ppb).unwrap(),
        service_fee: Rate::ZERO,
        start_date: date(2026, 3, 1),
        end_date: date(2026, 3, 31),
        status: CreditStatus::Signed,
    };
    credits::ActiveModel::from(&credit)
        .insert(db)
        .await
        .unwrap();

    let budget = BudgetLineItem {
        id: Uuid::new_v4(),
        credit_id: credit.id,
        campaign_id: campaign.id,
        amount: MoneyNano::new(amount),
        start_date: date(2026, 3, 1),
        end_date: date(2026, 3, 31),
        margin: margin_ppb.map(|ppb| Rate::from_ppb(ppb).unwrap()),
        sequence_number,
    };
    budgets::ActiveModel::from(&budget)
        .insert(db)
        .await
        .unwrap();
    budget
}

#[derive(Debug, Default)]
struct MapSpendSource {
    spend: HashMap<(NaiveDate, Uuid), RawSpend>,
}

impl MapSpendSource {
    fn set(&mut self, on: NaiveDate, campaign_id: Uuid, media: i64, data: i64) {
        self.spend.insert(
            (on, campaign_id),
            RawSpend::new(MoneyNano::new(media), MoneyNano::new(data)),
        );
    }
}

impl SpendSource for MapSpendSource {
    async fn campaign_spend(
        &self,
        on: NaiveDate,
        campaign_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RawSpend>, EngineError> {
        Ok(campaign_ids
            .iter()
            .filter_map(|id| self.spend.get(&(on, *id)).map(|spend| (*id, *spend)))
            .collect())
    }
}

#[tokio::test]
async fn factors_are_zero_without_statements_or_raw_spend() {
    let (engine, db) = engine_with_db().await;
    let campaign = seed_campaign(&db, true).await;

    let day = date(2026, 3, 5);
    let source = MapSpendSource::default();

    let factors = engine
        .effective_spend(&source, &[campaign.id], &[day])
        .await
        .unwrap();
    let campaign_factors = factors[&day][&campaign.id];
    assert_eq!(campaign_factors.actual_spend, Rate::ZERO);
    assert_eq!(campaign_factors.license_fee, Rate::ZERO);
    assert_eq!(campaign_factors.margin, Rate::ZERO);
}

#[tokio::test]
async fn capped_day_yields_partial_actual_spend_and_exact_fee_rate() {
    let (engine, db) = engine_with_db().await;
    let campaign = seed_campaign(&db, true).await;
    seed_funded_budget(&db, &campaign, 2_400_000_000_000, 200_000_000, None, 1).await;

    let day = date(2026, 3, 5);
    let mut source = MapSpendSource::default();
    source.set(day, campaign.id, 3_000_000_000_000, 500_000_000_000);

    engine
        .process(&source, &ProcessingRun::new(day, day))
        .await
        .unwrap();

    let factors = engine
        .effective_spend(&source, &[campaign.id], &[day])
        .await
        .unwrap();
    let campaign_factors = factors[&day][&campaign.id];

    // 2400 attributed of 3500 raw, truncated to ppb.
    assert_eq!(campaign_factors.actual_spend.ppb(), 685_714_285);
    // Fee over attributed spend recovers the credit's 20% exactly.
    assert_eq!(campaign_factors.license_fee.ppb(), 200_000_000);
    assert_eq!(campaign_factors.margin, Rate::ZERO);
}

#[tokio::test]
async fn manual_campaign_reaches_full_actual_spend() {
    let (engine, db) = engine_with_db().await;
    let campaign = seed_campaign(&db, false).await;
    seed_funded_budget(&db, &campaign, 1_000, 0, Some(100_000_000), 1).await;

    let day = date(2026, 3, 5);
    let mut source = MapSpendSource::default();
    source.set(day, campaign.id, 4_000, 0);

    engine
        .process(&source, &ProcessingRun::new(day, day))
        .await
        .unwrap();

    let factors = engine
        .effective_spend(&source, &[campaign.id], &[day])
        .await
        .unwrap();
    let campaign_factors = factors[&day][&campaign.id];

    // Manual overspend attributes the whole raw total, so the ratio is one.
    assert_eq!(campaign_factors.actual_spend, Rate::ONE);
    assert_eq!(campaign_factors.margin.ppb(), 100_000_000);
}

#[tokio::test]
async fn factors_cover_multiple_dates_and_campaigns() {
    let (engine, db) = engine_with_db().await;
    let active = seed_campaign(&db, true).await;
    let idle = seed_campaign(&db, true).await;
    seed_funded_budget(&db, &active, 10_000, 200_000_000, None, 1).await;

    let first_day = date(2026, 3, 5);
    let second_day = date(2026, 3, 6);
    let mut source = MapSpendSource::default();
    source.set(first_day, active.id, 1_000, 0);
    source.set(second_day, active.id, 500, 500);

    engine
        .process(&source, &ProcessingRun::new(first_day, second_day))
        .await
        .unwrap();

    let factors = engine
        .effective_spend(&source, &[active.id, idle.id], &[first_day, second_day])
        .await
        .unwrap();

    assert_eq!(factors.len(), 2);
    assert_eq!(factors[&first_day][&active.id].actual_spend, Rate::ONE);
    assert_eq!(factors[&second_day][&active.id].actual_spend, Rate::ONE);
    assert_eq!(
        factors[&first_day][&active.id].license_fee.ppb(),
        200_000_000
    );
    assert_eq!(factors[&first_day][&idle.id].actual_spend, Rate::ZERO);
}
