//! SQLite bet store
//!
//! Decimals are kept as TEXT so no precision is lost going through SQLite's
//! REAL type. Selections of a combined bet are a JSON array.

use super::{prepare_import, BetRepository};
use crate::error::{LedgerError, Result};
use crate::stats::settle;
use crate::types::{Bet, BetResult, NewBet, Selection};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Row, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS bets (
    id              TEXT PRIMARY KEY,
    date            TEXT NOT NULL,
    stake           TEXT NOT NULL,
    odds            TEXT NOT NULL,
    result          TEXT,
    unit_value      TEXT,
    profit_currency TEXT NOT NULL,
    profit_units    TEXT NOT NULL,
    description     TEXT,
    selections      TEXT NOT NULL DEFAULT '[]',
    created_at      INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_bets_date ON bets(date);
";

// A replaced bet keeps its original `created_at`, and with it its place
// among bets on the same date.
const UPSERT: &str = r"
INSERT INTO bets
    (id, date, stake, odds, result, unit_value, profit_currency, profit_units,
     description, selections, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
ON CONFLICT(id) DO UPDATE SET
    date = excluded.date,
    stake = excluded.stake,
    odds = excluded.odds,
    result = excluded.result,
    unit_value = excluded.unit_value,
    profit_currency = excluded.profit_currency,
    profit_units = excluded.profit_units,
    description = excluded.description,
    selections = excluded.selections
";

#[derive(Clone)]
pub struct SqliteBetStore {
    pool: SqlitePool,
}

impl SqliteBetStore {
    /// Open (creating if needed) the database file at `path`.
    pub async fn connect(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        info!("Bet store opened at {}", path);
        Ok(store)
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

/// Insert or replace one bet row.
async fn write_bet<'e, E>(executor: E, bet: &Bet) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let selections = serde_json::to_string(&bet.selections)?;
    sqlx::query(UPSERT)
        .bind(bet.id.to_string())
        .bind(bet.date.format("%Y-%m-%d").to_string())
        .bind(bet.stake.to_string())
        .bind(bet.odds.to_string())
        .bind(bet.result.map(|r| r.to_string()))
        .bind(bet.unit_value.map(|u| u.to_string()))
        .bind(bet.profit_currency.to_string())
        .bind(bet.profit_units.to_string())
        .bind(bet.description.clone())
        .bind(selections)
        .bind(chrono::Utc::now().timestamp())
        .execute(executor)
        .await?;
    Ok(())
}

fn parse_decimal(raw: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| LedgerError::Parse(format!("{}: {}", field, e)))
}

fn bet_from_row(row: &SqliteRow) -> Result<Bet> {
    let id: String = row.try_get("id")?;
    let date: String = row.try_get("date")?;
    let stake: String = row.try_get("stake")?;
    let odds: String = row.try_get("odds")?;
    let result: Option<String> = row.try_get("result")?;
    let unit_value: Option<String> = row.try_get("unit_value")?;
    let profit_currency: String = row.try_get("profit_currency")?;
    let profit_units: String = row.try_get("profit_units")?;
    let description: Option<String> = row.try_get("description")?;
    let selections: String = row.try_get("selections")?;

    Ok(Bet {
        id: Uuid::parse_str(&id).map_err(|e| LedgerError::Parse(format!("id: {}", e)))?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| LedgerError::Parse(format!("date: {}", e)))?,
        stake: parse_decimal(&stake, "stake")?,
        odds: parse_decimal(&odds, "odds")?,
        result: result
            .map(|r| BetResult::from_str(&r))
            .transpose()
            .map_err(LedgerError::Parse)?,
        unit_value: unit_value
            .map(|u| parse_decimal(&u, "unit_value"))
            .transpose()?,
        profit_currency: parse_decimal(&profit_currency, "profit_currency")?,
        profit_units: parse_decimal(&profit_units, "profit_units")?,
        description,
        selections: serde_json::from_str::<Vec<Selection>>(&selections)?,
    })
}

#[async_trait]
impl BetRepository for SqliteBetStore {
    async fn list(&self) -> Result<Vec<Bet>> {
        let rows = sqlx::query("SELECT * FROM bets ORDER BY date ASC, created_at ASC, rowid ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(bet_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Bet> {
        let row = sqlx::query("SELECT * FROM bets WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => bet_from_row(&row),
            None => Err(LedgerError::NotFound { id }),
        }
    }

    async fn insert(&self, bet: NewBet) -> Result<Bet> {
        let bet = bet.into_bet()?;
        write_bet(&self.pool, &bet).await?;
        debug!("Recorded bet {} ({} @ {})", bet.id, bet.stake, bet.odds);
        Ok(bet)
    }

    async fn set_result(&self, id: Uuid, result: Option<BetResult>) -> Result<Bet> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM bets WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let mut bet = match row {
            Some(row) => bet_from_row(&row)?,
            None => return Err(LedgerError::NotFound { id }),
        };
        settle(&mut bet, result);

        let done = sqlx::query(
            "UPDATE bets SET result = ?1, profit_currency = ?2, profit_units = ?3 WHERE id = ?4",
        )
        .bind(bet.result.map(|r| r.to_string()))
        .bind(bet.profit_currency.to_string())
        .bind(bet.profit_units.to_string())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;
        if done.rows_affected() == 0 {
            return Err(LedgerError::NotFound { id });
        }
        tx.commit().await?;

        info!(
            "Settled bet {} as {}: profit {}",
            id,
            result.map_or_else(|| "PENDING".to_string(), |r| r.to_string()),
            bet.profit_currency
        );
        Ok(bet)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let done = sqlx::query("DELETE FROM bets WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(LedgerError::NotFound { id });
        }
        Ok(())
    }

    async fn import(&self, bets: Vec<Bet>) -> Result<usize> {
        let prepared = bets
            .into_iter()
            .map(prepare_import)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;
        for bet in &prepared {
            write_bet(&mut *tx, bet).await?;
        }
        tx.commit().await?;

        info!("Imported {} bets", prepared.len());
        Ok(prepared.len())
    }
}
