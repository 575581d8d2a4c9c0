//! Configuration
//!
//! Loaded from an optional TOML file, then overridden by `BET_LEDGER__*`
//! environment variables (`BET_LEDGER__DASHBOARD__PORT=9000`).

use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub surebet: SurebetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Unit size applied to new bets that don't carry their own
    #[serde(default)]
    pub default_unit_value: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_unit_value: None,
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// Path with `~` and environment variables expanded
    pub fn resolved_path(&self) -> String {
        shellexpand::full(&self.path)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| self.path.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurebetConfig {
    /// Investment used when the calculator is run without one
    #[serde(default = "default_investment")]
    pub default_investment: Decimal,
}

impl Default for SurebetConfig {
    fn default() -> Self {
        Self {
            default_investment: default_investment(),
        }
    }
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_db_path() -> String {
    "~/.bet-ledger/bets.db".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_investment() -> Decimal {
    dec!(100)
}

impl Config {
    /// Load config from `path` (if it exists) plus environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("BET_LEDGER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(unit) = self.ledger.default_unit_value {
            if unit <= Decimal::ZERO {
                return Err(LedgerError::Config(format!(
                    "ledger.default_unit_value must be positive, got {}",
                    unit
                )));
            }
        }
        if self.database.path.trim().is_empty() {
            return Err(LedgerError::Config("database.path cannot be empty".into()));
        }
        if self.surebet.default_investment <= Decimal::ZERO {
            return Err(LedgerError::Config(format!(
                "surebet.default_investment must be positive, got {}",
                self.surebet.default_investment
            )));
        }
        Ok(())
    }
}
