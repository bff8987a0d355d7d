//! CSV-backed spend source.
//!
//! Batch runs are driven from an export of the raw reporting pipeline with
//! `date,campaign_id,media_spend_nano,data_spend_nano` rows. Rows for the
//! same campaign/date accumulate. Campaigns absent from the file had zero
//! measured spend, per the adapter contract.

use std::{collections::HashMap, path::Path};

use chrono::NaiveDate;
use engine::{EngineError, MoneyNano, RawSpend, SpendSource};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct SpendRecord {
    date: NaiveDate,
    campaign_id: Uuid,
    media_spend_nano: i64,
    data_spend_nano: i64,
}

#[derive(Debug, Default)]
pub struct CsvSpendSource {
    spend: HashMap<(NaiveDate, Uuid), RawSpend>,
}

impl CsvSpendSource {
    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut spend: HashMap<(NaiveDate, Uuid), RawSpend> = HashMap::new();
        for record in reader.deserialize() {
            let record: SpendRecord = record?;
            let entry = spend
                .entry((record.date, record.campaign_id))
                .or_insert(RawSpend::ZERO);
            entry.media += MoneyNano::new(record.media_spend_nano);
            entry.data += MoneyNano::new(record.data_spend_nano);
        }
        Ok(Self { spend })
    }
}

impl SpendSource for CsvSpendSource {
    async fn campaign_spend(
        &self,
        date: NaiveDate,
        campaign_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RawSpend>, EngineError> {
        Ok(campaign_ids
            .iter()
            .filter_map(|id| self.spend.get(&(date, *id)).map(|spend| (*id, *spend)))
            .collect())
    }
}
