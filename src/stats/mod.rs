//! Bet statistics
//!
//! Pure functions that fold a bet collection into dashboard figures:
//! - Unit conversion and per-bet profit
//! - Summary counts, hit rate, profit and ROI
//! - Daily / monthly time series for charts
//!
//! Results are snapshots. Callers recompute them whenever the bet set
//! changes; nothing here caches or updates incrementally.

pub mod profit;
pub mod timeline;
pub mod units;


pub use profit::{combined_odds, profit, settle};
pub use timeline::{
    cumulative, daily_buckets, fill_current_month, fill_gaps, monthly_buckets, CumulativePoint,
    DailyStats, MonthKey, MonthlyStats,
};
pub use units::to_units;

use crate::types::{Bet, BetResult};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round to cents, half away from zero.
pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Summary figures for the dashboard cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub won: usize,
    pub lost: usize,
    pub refunded: usize,
    pub pending: usize,
    /// Won bets as a percentage of decided (non-pending, non-refunded) bets
    pub hit_rate: Decimal,
    pub profit_currency: Decimal,
    pub profit_units: Decimal,
    /// Total stake across every bet in the set
    pub total_staked: Decimal,
    /// Profit as a percentage of `total_staked`
    pub roi: Decimal,
}

/// Fold a bet collection into dashboard statistics.
///
/// Order independent. Profits are the persisted per-bet figures; pending
/// bets carry zero.
pub fn aggregate(bets: &[Bet]) -> DashboardStats {
    let mut stats = DashboardStats {
        total: bets.len(),
        ..Default::default()
    };

    for bet in bets {
        match bet.result {
            Some(BetResult::Green) => stats.won += 1,
            Some(BetResult::Red) => stats.lost += 1,
            Some(BetResult::Refund) => stats.refunded += 1,
            None => stats.pending += 1,
        }
        stats.profit_currency += bet.profit_currency;
        stats.profit_units += bet.profit_units;
        stats.total_staked += bet.stake;
    }

    let decided = stats.total - stats.refunded - stats.pending;
    stats.hit_rate = if decided == 0 {
        Decimal::ZERO
    } else {
        round2(Decimal::from(stats.won) / Decimal::from(decided) * Decimal::ONE_HUNDRED)
    };

    stats.roi = if stats.total_staked.is_zero() {
        Decimal::ZERO
    } else {
        round2(stats.profit_currency / stats.total_staked * Decimal::ONE_HUNDRED)
    };

    stats.profit_currency = round2(stats.profit_currency);
    stats.profit_units = round2(stats.profit_units);
    stats.total_staked = round2(stats.total_staked);
    stats
}

/// Bets dated within `[from, to]`. A missing bound is open.
pub fn in_period(bets: &[Bet], from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<Bet> {
    bets.iter()
        .filter(|b| from.map_or(true, |f| b.date >= f))
        .filter(|b| to.map_or(true, |t| b.date <= t))
        .cloned()
        .collect()
}
