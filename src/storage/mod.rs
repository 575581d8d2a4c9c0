//! Bet persistence
//!
//! The statistics core never touches storage. Repositories hand out bet
//! snapshots and route every result change through `stats::settle`, so the
//! persisted profit fields always come from the profit formula.

pub mod sqlite;

#[cfg(test)]
mod tests;

pub use sqlite::SqliteBetStore;

use crate::error::{LedgerError, Result, ValidationError};
use crate::stats::{combined_odds, settle};
use crate::types::{check_amounts, Bet, BetResult, NewBet};
use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait BetRepository: Send + Sync {
    /// All bets, oldest first
    async fn list(&self) -> Result<Vec<Bet>>;

    async fn get(&self, id: Uuid) -> Result<Bet>;

    /// Validate, settle and store a new bet
    async fn insert(&self, bet: NewBet) -> Result<Bet>;

    /// Change a bet's result, recomputing its profit
    async fn set_result(&self, id: Uuid, result: Option<BetResult>) -> Result<Bet>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Bulk-load existing bets, replacing any with the same id
    async fn import(&self, bets: Vec<Bet>) -> Result<usize>;
}

/// Check an externally produced bet and recompute its derived fields.
///
/// A bet with selections takes the product of their odds, whatever odds the
/// export carried.
pub(crate) fn prepare_import(mut bet: Bet) -> std::result::Result<Bet, ValidationError> {
    if !bet.selections.is_empty() {
        bet.odds = combined_odds(&bet.selections)?;
    }
    check_amounts(bet.stake, bet.odds, bet.unit_value)?;

    let result = bet.result;
    settle(&mut bet, result);
    Ok(bet)
}

/// In-process store, used by tests and the file-based CLI flows
#[derive(Default)]
pub struct MemoryBetStore {
    bets: RwLock<Vec<Bet>>,
}

impl MemoryBetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bets(bets: Vec<Bet>) -> Result<Self> {
        let prepared = bets
            .into_iter()
            .map(prepare_import)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            bets: RwLock::new(prepared),
        })
    }
}

#[async_trait]
impl BetRepository for MemoryBetStore {
    async fn list(&self) -> Result<Vec<Bet>> {
        let mut bets = self.bets.read().clone();
        bets.sort_by_key(|b| b.date);
        Ok(bets)
    }

    async fn get(&self, id: Uuid) -> Result<Bet> {
        self.bets
            .read()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(LedgerError::NotFound { id })
    }

    async fn insert(&self, bet: NewBet) -> Result<Bet> {
        let bet = bet.into_bet()?;
        self.bets.write().push(bet.clone());
        Ok(bet)
    }

    async fn set_result(&self, id: Uuid, result: Option<BetResult>) -> Result<Bet> {
        let mut bets = self.bets.write();
        let bet = bets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(LedgerError::NotFound { id })?;
        settle(bet, result);
        Ok(bet.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut bets = self.bets.write();
        let before = bets.len();
        bets.retain(|b| b.id != id);
        if bets.len() == before {
            return Err(LedgerError::NotFound { id });
        }
        Ok(())
    }

    async fn import(&self, bets: Vec<Bet>) -> Result<usize> {
        let prepared = bets
            .into_iter()
            .map(prepare_import)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let count = prepared.len();

        let mut stored = self.bets.write();
        for bet in prepared {
            match stored.iter_mut().find(|b| b.id == bet.id) {
                Some(existing) => *existing = bet,
                None => stored.push(bet),
            }
        }
        Ok(count)
    }
}
