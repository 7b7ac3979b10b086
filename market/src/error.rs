//! Marketplace error types

use stargem_core::{CurrencyError, Grade};
use thiserror::Error;

/// Errors returned by shop and auction operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("no entry at position {0}")]
    NotFound(usize),

    #[error("insufficient funds: need {need} gems at grade {grade:?}")]
    InsufficientFunds { grade: Grade, need: u64 },

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("purchase limit of {limit} reached")]
    PurchaseLimitExceeded { limit: u32 },

    #[error("cannot buy your own listing")]
    SelfTrade,

    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

pub type Result<T> = std::result::Result<T, MarketError>;
