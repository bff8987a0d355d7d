//! Waterfall allocation of one day's campaign spend across ordered budgets.
//!
//! The allocation step is a pure function: `(policy, spend, candidates) ->
//! allocations`. All ledger writes happen in a separate, explicitly sequenced
//! persistence step (see `ops::ledger`), so the policy branching here can be
//! tested without a database.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetLineItem, CreditLineItem, FeeSchedule, MoneyNano, RawSpend, ResultEngine,
};

/// What happens to spend that exceeds the total remaining capacity of a
/// campaign's budgets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverspendPolicy {
    /// Campaigns with automatic stop enabled never attribute more than the
    /// total available capacity; the excess is dropped, recorded nowhere.
    AutomaticStop,
    /// Manual campaigns attribute the full day's spend. Whatever exceeds all
    /// budgets' remaining capacity lands on the last (most recently created)
    /// candidate, which is allowed to go over budget. Business rule carried
    /// over from the billing team, not an error-recovery path.
    Manual,
}

/// One candidate budget for a date, resolved and ordered by the budget
/// resolver: the budget, its owning credit, and the capacity it has left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetCandidate {
    pub budget: BudgetLineItem,
    pub credit: CreditLineItem,
    pub remaining: MoneyNano,
}

/// Per-budget attribution for one date. Amounts may be zero: active budgets
/// get explicit zero rows so the ledger records the date as processed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub budget_id: Uuid,
    pub media_spend: MoneyNano,
    pub data_spend: MoneyNano,
    pub license_fee: MoneyNano,
    pub margin: MoneyNano,
}

impl Allocation {
    #[must_use]
    pub fn total_spend(&self) -> MoneyNano {
        self.media_spend + self.data_spend
    }
}

/// Distributes one day's raw spend across the ordered candidates.
///
/// Media and data are combined into a single attributable total for capacity
/// purposes, then each budget's attributed amount is split back pro-rata to
/// the original media:data ratio. Fees and margins are computed per slice
/// from that budget's own credit, so simultaneously active budgets with
/// different license fees produce different fee rates on the same date.
///
/// Candidates must arrive in waterfall order (ascending sequence number).
/// Returns one allocation per candidate, zeros included; no candidates means
/// no allocations, under either policy.
pub fn allocate(
    policy: OverspendPolicy,
    spend: RawSpend,
    candidates: &[BudgetCandidate],
) -> ResultEngine<Vec<Allocation>> {
    spend.validate()?;

    let total = spend.total();
    let mut attributed = vec![MoneyNano::ZERO; candidates.len()];
    let mut unallocated = total;

    for (slot, candidate) in attributed.iter_mut().zip(candidates) {
        // Negative remaining capacity is treated as zero.
        let capacity = candidate.remaining.max(MoneyNano::ZERO);
        let take = capacity.min(unallocated);
        *slot = take;
        unallocated -= take;
        if unallocated.is_zero() {
            break;
        }
    }

    if !unallocated.is_zero()
        && policy == OverspendPolicy::Manual
        && let Some(last) = attributed.last_mut()
    {
        *last += unallocated;
    }

    let allocations = candidates
        .iter()
        .zip(attributed)
        .map(|(candidate, amount)| {
            let media = prorate(amount, spend.media, total);
            // Data takes the remainder so the split always sums to `amount`.
            let data = amount - media;
            let fees = FeeSchedule::resolve(&candidate.credit, &candidate.budget);
            Allocation {
                budget_id: candidate.budget.id,
                media_spend: media,
                data_spend: data,
                license_fee: fees.license_fee.apply(amount),
                margin: fees.margin.apply(amount),
            }
        })
        .collect();

    Ok(allocations)
}

/// `amount * part / total`, truncated toward zero. Zero total means zero.
fn prorate(amount: MoneyNano, part: MoneyNano, total: MoneyNano) -> MoneyNano {
    if total.is_zero() {
        return MoneyNano::ZERO;
    }
    let scaled = amount.nanos() as i128 * part.nanos() as i128 / total.nanos() as i128;
    MoneyNano::new(scaled as i64)
}
