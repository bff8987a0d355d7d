//! Engine operations: candidate resolution, statement persistence, the
//! batch-processing driver and the derived effective-spend factors.
//!
//! The engine owns only a database connection. All day-level writes are
//! bracketed in a transaction by the driver so an aborted date commits
//! nothing.

use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod factors;
mod ledger;
mod process;
mod resolver;

pub use factors::EffectiveSpendFactors;
pub use process::{CampaignFailure, ProcessingRun, RunSummary};

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
