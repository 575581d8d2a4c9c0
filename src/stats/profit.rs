//! Profit calculation for settled bets

use super::round2;
use super::units::to_units;
use crate::error::ValidationError;
use crate::types::{Bet, BetResult, Selection};
use rust_decimal::Decimal;

/// Profit of a bet given its outcome.
///
/// Trusts its inputs: odds below 1 or a negative stake are not rejected
/// here. Validation happens when a bet is recorded (`NewBet::validate`).
pub fn profit(stake: Decimal, odds: Decimal, result: Option<BetResult>) -> Decimal {
    match result {
        Some(BetResult::Green) => round2(stake * odds - stake),
        Some(BetResult::Red) => -stake,
        Some(BetResult::Refund) | None => Decimal::ZERO,
    }
}

/// Set a bet's result and recompute its stored profit fields.
///
/// Every write of a result goes through here so the persisted profit never
/// drifts from the formula.
pub fn settle(bet: &mut Bet, result: Option<BetResult>) {
    bet.result = result;
    bet.profit_currency = profit(bet.stake, bet.odds, result);
    bet.profit_units = to_units(bet.profit_currency, bet.unit_value);
}

/// Odds of a combined bet: the product of its selections' odds.
///
/// Legs below evens are rejected, and so is a product too large for
/// `Decimal`.
pub fn combined_odds(selections: &[Selection]) -> Result<Decimal, ValidationError> {
    if selections.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let mut odds = Decimal::ONE;
    for selection in selections {
        if selection.odds < Decimal::ONE {
            return Err(ValidationError::InvalidOdds { odds: selection.odds });
        }
        odds = odds
            .checked_mul(selection.odds)
            .ok_or(ValidationError::Overflow)?;
    }
    Ok(odds)
}
