//! Daily and monthly time series for charts

use super::round2;
use crate::types::Bet;
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Activity on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub bets: usize,
    pub profit_currency: Decimal,
    pub profit_units: Decimal,
}

impl DailyStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            bets: 0,
            profit_currency: Decimal::ZERO,
            profit_units: Decimal::ZERO,
        }
    }
}

/// Calendar month, ordered by year then month.
///
/// Serialized as `yyyy-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Every day of the month, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        match self.first_day() {
            Some(first) => first
                .iter_days()
                .take_while(|d| d.month() == self.month)
                .collect(),
            None => Vec::new(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("invalid month '{}', expected yyyy-MM", s))?;
        let year: i32 = year.parse().map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month.parse().map_err(|_| format!("invalid month in '{}'", s))?;
        MonthKey::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Activity in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub month: MonthKey,
    pub bets: usize,
    pub profit_currency: Decimal,
    pub profit_units: Decimal,
}

/// Running profit total at the end of a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub profit_currency: Decimal,
    pub profit_units: Decimal,
}

#[derive(Default)]
struct Bucket {
    bets: usize,
    profit_currency: Decimal,
    profit_units: Decimal,
}

impl Bucket {
    fn add(&mut self, bet: &Bet) {
        self.bets += 1;
        self.profit_currency += bet.profit_currency;
        self.profit_units += bet.profit_units;
    }
}

/// Group bets by calendar day, ascending. Only days with bets appear.
pub fn daily_buckets(bets: &[Bet]) -> Vec<DailyStats> {
    let mut days: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
    for bet in bets {
        days.entry(bet.date).or_default().add(bet);
    }

    days.into_iter()
        .map(|(date, b)| DailyStats {
            date,
            bets: b.bets,
            profit_currency: round2(b.profit_currency),
            profit_units: round2(b.profit_units),
        })
        .collect()
}

/// Group bets by calendar month, in chronological order.
pub fn monthly_buckets(bets: &[Bet]) -> Vec<MonthlyStats> {
    let mut months: BTreeMap<MonthKey, Bucket> = BTreeMap::new();
    for bet in bets {
        months.entry(MonthKey::of(bet.date)).or_default().add(bet);
    }

    months
        .into_iter()
        .map(|(month, b)| MonthlyStats {
            month,
            bets: b.bets,
            profit_currency: round2(b.profit_currency),
            profit_units: round2(b.profit_units),
        })
        .collect()
}

/// One entry per day of `today`'s month, zero-filled where there was no
/// activity. Buckets from other months are left out.
pub fn fill_gaps(daily: &[DailyStats], today: NaiveDate) -> Vec<DailyStats> {
    let by_date: HashMap<NaiveDate, &DailyStats> = daily.iter().map(|d| (d.date, d)).collect();

    MonthKey::of(today)
        .days()
        .into_iter()
        .map(|date| {
            by_date
                .get(&date)
                .map(|d| (*d).clone())
                .unwrap_or_else(|| DailyStats::empty(date))
        })
        .collect()
}

/// `fill_gaps` against the local wall-clock date.
pub fn fill_current_month(daily: &[DailyStats]) -> Vec<DailyStats> {
    fill_gaps(daily, Local::now().date_naive())
}

/// Running profit totals over a daily series, in input order.
pub fn cumulative(daily: &[DailyStats]) -> Vec<CumulativePoint> {
    let mut currency = Decimal::ZERO;
    let mut units = Decimal::ZERO;

    daily
        .iter()
        .map(|d| {
            currency += d.profit_currency;
            units += d.profit_units;
            CumulativePoint {
                date: d.date,
                profit_currency: currency,
                profit_units: units,
            }
        })
        .collect()
}
