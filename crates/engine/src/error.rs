//! The module contains the errors the engine can throw.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("spend source failure: {0}")]
    SpendSource(String),
    #[error("negative raw spend: {0}")]
    NegativeSpend(String),
    #[error("budget references missing credit: {0}")]
    MissingCredit(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid rate: {0}")]
    InvalidRate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date window: {0}")]
    InvalidWindow(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SpendSource(a), Self::SpendSource(b)) => a == b,
            (Self::NegativeSpend(a), Self::NegativeSpend(b)) => a == b,
            (Self::MissingCredit(a), Self::MissingCredit(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidRate(a), Self::InvalidRate(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidWindow(a), Self::InvalidWindow(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
