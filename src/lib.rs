//! Bet Ledger
//!
//! Personal sports-betting ledger: records bets, derives profit and
//! dashboard statistics from them, and solves two-outcome surebets.
//!
//! ## Architecture
//!
//! ```text
//! CLI / Dashboard API → Storage (memory, SQLite) → Bet snapshot
//!                                                      ↓
//!                        Stats (units, profit, aggregate, timeline)
//!                        Surebet solver
//! ```
//!
//! The stats and surebet modules are pure functions over in-memory values.
//! Storage and the dashboard only move data in and out of them.

pub mod config;
pub mod error;
pub mod monitor;
pub mod stats;
pub mod storage;
pub mod surebet;
pub mod types;

#[cfg(test)]
mod config_tests;
