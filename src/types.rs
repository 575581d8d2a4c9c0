//! Core ledger types

use crate::error::ValidationError;
use crate::stats::profit::{combined_odds, settle};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Settlement outcome of a bet. A bet without a result is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetResult {
    #[serde(rename = "GREEN")]
    Green,
    #[serde(rename = "RED")]
    Red,
    /// Void bet, stake returned.
    #[serde(rename = "REEMBOLSO")]
    Refund,
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BetResult::Green => "GREEN",
            BetResult::Red => "RED",
            BetResult::Refund => "REEMBOLSO",
        };
        f.write_str(s)
    }
}

impl FromStr for BetResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "green" | "won" | "win" => Ok(BetResult::Green),
            "red" | "lost" | "loss" => Ok(BetResult::Red),
            "reembolso" | "refund" | "void" => Ok(BetResult::Refund),
            other => Err(format!("unknown bet result '{}'", other)),
        }
    }
}

/// One leg of a combined (accumulator) bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub description: String,
    pub odds: Decimal,
}

impl Selection {
    pub fn new(description: impl Into<String>, odds: Decimal) -> Self {
        Self {
            description: description.into(),
            odds,
        }
    }
}

/// A recorded bet.
///
/// `profit_currency` and `profit_units` are derived when the result is
/// written and are read back as-is by the aggregators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub id: Uuid,
    #[serde(deserialize_with = "deserialize_bet_date")]
    pub date: NaiveDate,
    pub stake: Decimal,
    pub odds: Decimal,
    #[serde(default)]
    pub result: Option<BetResult>,
    #[serde(default)]
    pub unit_value: Option<Decimal>,
    #[serde(default)]
    pub profit_currency: Decimal,
    #[serde(default)]
    pub profit_units: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub selections: Vec<Selection>,
}

impl Bet {
    pub fn is_pending(&self) -> bool {
        self.result.is_none()
    }

    /// A bet priced from its selections rather than a single quoted odds.
    pub fn is_combined(&self) -> bool {
        !self.selections.is_empty()
    }
}

/// Largest stake, and largest payout, a single bet may carry.
///
/// Keeps per-bet profit, unit conversion and ledger-wide sums far inside
/// `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Bounds every recorded bet must satisfy before its profit is computed.
pub(crate) fn check_amounts(
    stake: Decimal,
    odds: Decimal,
    unit_value: Option<Decimal>,
) -> Result<(), ValidationError> {
    if stake <= Decimal::ZERO {
        return Err(ValidationError::InvalidStake { stake });
    }
    if stake > MAX_AMOUNT {
        return Err(ValidationError::StakeTooLarge {
            stake,
            max: MAX_AMOUNT,
        });
    }
    if odds < Decimal::ONE {
        return Err(ValidationError::InvalidOdds { odds });
    }

    let payout = stake
        .checked_mul(odds)
        .filter(|p| *p <= MAX_AMOUNT)
        .ok_or(ValidationError::Overflow)?;
    if let Some(unit) = unit_value.filter(|u| !u.is_zero()) {
        payout
            .checked_div(unit)
            .filter(|u| u.abs() <= MAX_AMOUNT)
            .ok_or(ValidationError::Overflow)?;
    }
    Ok(())
}

/// Input for recording a new bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBet {
    #[serde(deserialize_with = "deserialize_bet_date")]
    pub date: NaiveDate,
    pub stake: Decimal,
    /// Odds of a single bet. Ignored when `selections` is non-empty.
    #[serde(default)]
    pub odds: Option<Decimal>,
    #[serde(default)]
    pub selections: Vec<Selection>,
    #[serde(default)]
    pub result: Option<BetResult>,
    #[serde(default)]
    pub unit_value: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewBet {
    pub fn single(date: NaiveDate, stake: Decimal, odds: Decimal) -> Self {
        Self {
            date,
            stake,
            odds: Some(odds),
            selections: Vec::new(),
            result: None,
            unit_value: None,
            description: None,
        }
    }

    pub fn combined(date: NaiveDate, stake: Decimal, selections: Vec<Selection>) -> Self {
        Self {
            date,
            stake,
            odds: None,
            selections,
            result: None,
            unit_value: None,
            description: None,
        }
    }

    pub fn with_result(mut self, result: Option<BetResult>) -> Self {
        self.result = result;
        self
    }

    pub fn with_unit_value(mut self, unit_value: Decimal) -> Self {
        self.unit_value = Some(unit_value);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check stake and odds, returning the odds the bet will carry.
    pub fn validate(&self) -> Result<Decimal, ValidationError> {
        if self.stake <= Decimal::ZERO {
            return Err(ValidationError::InvalidStake { stake: self.stake });
        }

        let odds = if self.selections.is_empty() {
            self.odds.ok_or(ValidationError::MissingOdds)?
        } else {
            combined_odds(&self.selections)?
        };

        check_amounts(self.stake, odds, self.unit_value)?;
        Ok(odds)
    }

    /// Validate and turn into a settled `Bet` with a fresh id.
    pub fn into_bet(self) -> Result<Bet, ValidationError> {
        let odds = self.validate()?;
        let mut bet = Bet {
            id: Uuid::new_v4(),
            date: self.date,
            stake: self.stake,
            odds,
            result: None,
            unit_value: self.unit_value,
            profit_currency: Decimal::ZERO,
            profit_units: Decimal::ZERO,
            description: self.description,
            selections: self.selections,
        };
        settle(&mut bet, self.result);
        Ok(bet)
    }
}

/// Parse a bet date from an ISO 8601 date, with or without time-of-day.
///
/// The calendar date is taken as written: `2024-03-01T23:30:00-03:00` is
/// March 1st, not converted to UTC.
pub fn parse_bet_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", s, e))
}

fn deserialize_bet_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_bet_date(&raw).map_err(serde::de::Error::custom)
}
