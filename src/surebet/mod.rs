//! Two-outcome surebet (arbitrage) calculator
//!
//! Splits a stake across two bookmakers so the payout is the same whichever
//! outcome wins:
//! - Feasibility from the combined implied probability `1/odds_a + 1/odds_b`
//! - Payout-equalizing split of a target investment
//! - Re-solve around a bookmaker's maximum stake, which pins that leg and
//!   overrides the investment
//!
//! ```rust,ignore
//! use bet_ledger::surebet::{solve, ArbitrageLeg, SurebetRequest};
//!
//! let request = SurebetRequest::new(ArbitrageLeg::new(dec!(2.10)), ArbitrageLeg::new(dec!(2.05)), dec!(1000));
//! let outcome = solve(&request)?;
//! ```


use crate::error::ValidationError;
use crate::stats::round2;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegSide {
    A,
    B,
}

/// One side of the surebet: the odds on offer at one bookmaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageLeg {
    pub odds: Decimal,
    /// Largest stake the bookmaker accepts. `None` or zero means no cap.
    #[serde(default)]
    pub max_stake: Option<Decimal>,
    /// Percentage of net winnings kept by the bookmaker (betting exchanges).
    #[serde(default)]
    pub commission: Option<Decimal>,
}

impl ArbitrageLeg {
    pub fn new(odds: Decimal) -> Self {
        Self {
            odds,
            max_stake: None,
            commission: None,
        }
    }

    pub fn with_max_stake(mut self, max_stake: Decimal) -> Self {
        self.max_stake = Some(max_stake);
        self
    }

    pub fn with_commission(mut self, commission: Decimal) -> Self {
        self.commission = Some(commission);
        self
    }

    /// Odds after commission: `1 + (odds - 1) * (1 - commission / 100)`.
    pub fn effective_odds(&self) -> Decimal {
        match self.commission {
            Some(c) if !c.is_zero() => {
                Decimal::ONE + (self.odds - Decimal::ONE) * (Decimal::ONE - c / Decimal::ONE_HUNDRED)
            }
            _ => self.odds,
        }
    }

    /// The cap when one is actually set.
    fn cap(&self) -> Option<Decimal> {
        self.max_stake.filter(|m| *m > Decimal::ZERO)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.odds <= Decimal::ONE {
            return Err(ValidationError::InvalidOdds { odds: self.odds });
        }
        if let Some(commission) = self.commission {
            if commission < Decimal::ZERO || commission >= Decimal::ONE_HUNDRED {
                return Err(ValidationError::InvalidCommission { commission });
            }
        }
        if let Some(max_stake) = self.max_stake {
            if max_stake < Decimal::ZERO {
                return Err(ValidationError::InvalidMaxStake { max_stake });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurebetRequest {
    pub leg_a: ArbitrageLeg,
    pub leg_b: ArbitrageLeg,
    /// Total to split. Only used when no cap pins a leg.
    #[serde(default)]
    pub investment: Decimal,
}

impl SurebetRequest {
    pub fn new(leg_a: ArbitrageLeg, leg_b: ArbitrageLeg, investment: Decimal) -> Self {
        Self {
            leg_a,
            leg_b,
            investment,
        }
    }
}

/// Recommended stakes and the profit they lock in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurebetOutcome {
    pub stake_a: Decimal,
    pub stake_b: Decimal,
    /// Investment the split actually uses. Differs from the request when a
    /// cap pinned a leg.
    pub total_investment: Decimal,
    /// Combined implied probability as a percentage
    pub surebet_percentage: Decimal,
    pub guaranteed_profit: Decimal,
    /// Profit if outcome A wins
    pub profit_a: Decimal,
    /// Profit if outcome B wins
    pub profit_b: Decimal,
    pub is_opportunity: bool,
    /// Leg whose max stake fixed the split
    pub pinned: Option<LegSide>,
}

impl SurebetOutcome {
    fn no_opportunity(surebet_percentage: Decimal) -> Self {
        Self {
            stake_a: Decimal::ZERO,
            stake_b: Decimal::ZERO,
            total_investment: Decimal::ZERO,
            surebet_percentage,
            guaranteed_profit: Decimal::ZERO,
            profit_a: Decimal::ZERO,
            profit_b: Decimal::ZERO,
            is_opportunity: false,
            pinned: None,
        }
    }
}

/// Unrounded stake split
struct Split {
    stake_a: Decimal,
    stake_b: Decimal,
    total: Decimal,
    pinned: Option<LegSide>,
}

impl Split {
    fn proportional(
        investment: Decimal,
        odds_a: Decimal,
        implied: Decimal,
    ) -> Result<Self, ValidationError> {
        let stake_a = investment
            .checked_div(odds_a)
            .and_then(|s| s.checked_div(implied))
            .ok_or(ValidationError::Overflow)?;
        Ok(Self {
            stake_a,
            stake_b: investment - stake_a,
            total: investment,
            pinned: None,
        })
    }

    /// Fix one leg at its cap and size the other to equalize payout.
    fn pinned(
        side: LegSide,
        cap: Decimal,
        odds_a: Decimal,
        odds_b: Decimal,
    ) -> Result<Self, ValidationError> {
        let (own, other) = match side {
            LegSide::A => (odds_a, odds_b),
            LegSide::B => (odds_b, odds_a),
        };
        let total = own
            .checked_div(other)
            .and_then(|ratio| cap.checked_mul(Decimal::ONE + ratio))
            .ok_or(ValidationError::Overflow)?;
        let rest = total - cap;
        let (stake_a, stake_b) = match side {
            LegSide::A => (cap, rest),
            LegSide::B => (rest, cap),
        };
        Ok(Self {
            stake_a,
            stake_b,
            total,
            pinned: Some(side),
        })
    }
}

/// Net result if the leg staked `stake` at `odds` wins.
fn leg_profit(stake: Decimal, odds: Decimal, total: Decimal) -> Result<Decimal, ValidationError> {
    stake
        .checked_mul(odds)
        .and_then(|payout| payout.checked_sub(total))
        .ok_or(ValidationError::Overflow)
}

/// Combined implied probability of the two legs, after commission.
pub fn implied_probability(leg_a: &ArbitrageLeg, leg_b: &ArbitrageLeg) -> Decimal {
    Decimal::ONE / leg_a.effective_odds() + Decimal::ONE / leg_b.effective_odds()
}

/// Solve the stake split for a two-outcome surebet.
///
/// No arbitrage (implied probability at or above 100%) is a valid result
/// with zero stakes, not an error. Stakes or payouts beyond `Decimal`'s
/// range are `ValidationError::Overflow`.
///
/// With a single cap, that leg is pinned at its cap and the total is
/// derived from it. With both legs capped, the proportional split is kept
/// while it fits under both caps; otherwise the leg that overflows first as
/// the investment grows (smaller `cap * odds`, leg A on ties) is pinned,
/// which keeps the other leg under its own cap.
pub fn solve(request: &SurebetRequest) -> Result<SurebetOutcome, ValidationError> {
    let (leg_a, leg_b) = (&request.leg_a, &request.leg_b);
    leg_a.validate()?;
    leg_b.validate()?;

    let odds_a = leg_a.effective_odds();
    let odds_b = leg_b.effective_odds();
    let implied = implied_probability(leg_a, leg_b);
    let percentage = implied * Decimal::ONE_HUNDRED;

    if implied >= Decimal::ONE {
        return Ok(SurebetOutcome::no_opportunity(round2(percentage)));
    }

    let investment = request.investment;
    let split = match (leg_a.cap(), leg_b.cap()) {
        (None, None) => {
            if investment <= Decimal::ZERO {
                return Err(ValidationError::InvalidInvestment { investment });
            }
            Split::proportional(investment, odds_a, implied)?
        }
        (Some(cap), None) => Split::pinned(LegSide::A, cap, odds_a, odds_b)?,
        (None, Some(cap)) => Split::pinned(LegSide::B, cap, odds_a, odds_b)?,
        (Some(cap_a), Some(cap_b)) => {
            let within_caps = if investment > Decimal::ZERO {
                Some(Split::proportional(investment, odds_a, implied)?)
                    .filter(|s| s.stake_a <= cap_a && s.stake_b <= cap_b)
            } else {
                None
            };

            match within_caps {
                Some(split) => split,
                None => {
                    let payout_a = cap_a.checked_mul(odds_a).ok_or(ValidationError::Overflow)?;
                    let payout_b = cap_b.checked_mul(odds_b).ok_or(ValidationError::Overflow)?;
                    if payout_a <= payout_b {
                        Split::pinned(LegSide::A, cap_a, odds_a, odds_b)?
                    } else {
                        Split::pinned(LegSide::B, cap_b, odds_a, odds_b)?
                    }
                }
            }
        }
    };

    let profit_a = leg_profit(split.stake_a, odds_a, split.total)?;
    let profit_b = leg_profit(split.stake_b, odds_b, split.total)?;

    Ok(SurebetOutcome {
        stake_a: round2(split.stake_a),
        stake_b: round2(split.stake_b),
        total_investment: round2(split.total),
        surebet_percentage: round2(percentage),
        guaranteed_profit: round2(profit_a.min(profit_b)),
        profit_a: round2(profit_a),
        profit_b: round2(profit_b),
        is_opportunity: percentage > Decimal::ZERO && percentage < Decimal::ONE_HUNDRED,
        pinned: split.pinned,
    })
}
