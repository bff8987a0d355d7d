pub use allocation::{Allocation, BudgetCandidate, OverspendPolicy, allocate};
pub use budgets::{BudgetLineItem, BudgetState};
pub use campaigns::Campaign;
pub use credits::{CreditLineItem, CreditStatus, FeeSchedule};
pub use error::EngineError;
pub use money::{MoneyNano, Rate};
pub use ops::{
    CampaignFailure, EffectiveSpendFactors, Engine, EngineBuilder, ProcessingRun, RunSummary,
};
pub use spend::{RawSpend, SpendSource};
pub use statements::BudgetDailyStatement;

pub mod allocation;
pub mod budgets;
pub mod campaigns;
pub mod credits;
mod error;
pub mod money;
mod ops;
pub mod spend;
pub mod statements;

type ResultEngine<T> = Result<T, EngineError>;
