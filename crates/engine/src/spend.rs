//! Boundary to the external spend-reporting service.

use std::{collections::HashMap, future::Future};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, MoneyNano, ResultEngine};

/// Raw media/data spend reported for one campaign on one date, in nano-units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawSpend {
    pub media: MoneyNano,
    pub data: MoneyNano,
}

impl RawSpend {
    pub const ZERO: RawSpend = RawSpend {
        media: MoneyNano::ZERO,
        data: MoneyNano::ZERO,
    };

    #[must_use]
    pub fn new(media: MoneyNano, data: MoneyNano) -> Self {
        Self { media, data }
    }

    /// Combined media + data spend, the attributable total.
    #[must_use]
    pub fn total(self) -> MoneyNano {
        self.media + self.data
    }

    /// Negative raw spend is a precondition violation, never clamped.
    pub fn validate(self) -> ResultEngine<()> {
        if self.media.is_negative() || self.data.is_negative() {
            return Err(EngineError::NegativeSpend(format!(
                "media {} / data {}",
                self.media, self.data
            )));
        }
        Ok(())
    }
}

/// Adapter over the external time-series aggregation service that reports
/// per-campaign raw spend.
///
/// Contract: a campaign absent from the returned map had zero measured spend
/// that day (absence means zero, not error). Transport or query failures
/// surface as [`EngineError::SpendSource`] and abort the affected campaign's
/// batch; retries and timeouts belong to the adapter's transport, not to the
/// engine.
pub trait SpendSource {
    fn campaign_spend(
        &self,
        date: NaiveDate,
        campaign_ids: &[Uuid],
    ) -> impl Future<Output = ResultEngine<HashMap<Uuid, RawSpend>>> + Send;
}
