//! Error types for the ledger

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Input validation failures raised by the calculation core.
///
/// Degenerate inputs (zero unit value, empty bet set, zero stake sum) are not
/// errors; they resolve to zero-valued outputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid odds: {odds} (decimal odds must be above 1)")]
    InvalidOdds { odds: Decimal },

    #[error("Invalid investment: {investment} (must be positive)")]
    InvalidInvestment { investment: Decimal },

    #[error("Invalid stake: {stake} (must be positive)")]
    InvalidStake { stake: Decimal },

    #[error("Invalid max stake: {max_stake} (must not be negative)")]
    InvalidMaxStake { max_stake: Decimal },

    #[error("Invalid commission: {commission}% (must be in [0, 100))")]
    InvalidCommission { commission: Decimal },

    #[error("Combined bet needs at least one selection")]
    EmptySelection,

    #[error("Single bet needs odds")]
    MissingOdds,

    #[error("Stake too large: {stake} (limit {max})")]
    StakeTooLarge { stake: Decimal, max: Decimal },

    #[error("Amounts too large to calculate with")]
    Overflow,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Bet not found: {id}")]
    NotFound { id: Uuid },
}

impl From<config::ConfigError> for LedgerError {
    fn from(err: config::ConfigError) -> Self {
        LedgerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
