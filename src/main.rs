//! Bet Ledger
//!
//! Command-line front end: record and settle bets, print statistics, run the
//! surebet calculator, or serve the dashboard API.

use bet_ledger::{
    config::Config,
    monitor::{start_dashboard, DashboardState},
    stats::{self, MonthKey},
    storage::{BetRepository, SqliteBetStore},
    surebet::{self, ArbitrageLeg, SurebetRequest},
    types::{parse_bet_date, Bet, BetResult, NewBet, Selection},
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "bet-ledger")]
#[command(about = "Sports betting ledger with dashboard statistics and a surebet calculator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new bet
    Add {
        /// Bet date (yyyy-MM-dd or ISO date-time), today if omitted
        #[arg(long, value_parser = parse_bet_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        stake: Decimal,
        /// Odds of a single bet
        #[arg(long, required_unless_present = "selections", conflicts_with = "selections")]
        odds: Option<Decimal>,
        /// Leg of a combined bet as description=odds (repeatable)
        #[arg(long = "selection", id = "selections", value_parser = parse_selection)]
        selections: Vec<Selection>,
        /// green, red or refund. Pending if omitted
        #[arg(long)]
        result: Option<BetResult>,
        /// Unit size for this bet (falls back to ledger.default_unit_value)
        #[arg(long)]
        unit_value: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Set or clear the result of a bet
    Settle {
        id: Uuid,
        /// green, red, refund or pending
        result: String,
    },
    /// Delete a bet
    Delete { id: Uuid },
    /// List all bets
    List,
    /// Import bets from a JSON export
    Import { file: PathBuf },
    /// Show summary statistics
    Stats {
        #[arg(long, value_parser = parse_bet_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_bet_date)]
        to: Option<NaiveDate>,
    },
    /// Show day-by-day results for a month
    Daily {
        /// Month as yyyy-MM, the current month if omitted
        #[arg(long)]
        month: Option<MonthKey>,
    },
    /// Show month-by-month results
    Monthly,
    /// Calculate a two-outcome surebet
    Surebet {
        #[arg(long)]
        odds_a: Decimal,
        #[arg(long)]
        odds_b: Decimal,
        /// Total to invest (defaults to surebet.default_investment)
        #[arg(long)]
        investment: Option<Decimal>,
        #[arg(long)]
        max_a: Option<Decimal>,
        #[arg(long)]
        max_b: Option<Decimal>,
        /// Exchange commission on leg A winnings, in percent
        #[arg(long)]
        commission_a: Option<Decimal>,
        #[arg(long)]
        commission_b: Option<Decimal>,
    },
    /// Serve the dashboard API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn parse_selection(raw: &str) -> Result<Selection, String> {
    let (description, odds) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected description=odds, got '{}'", raw))?;
    let odds = odds
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid odds in '{}': {}", raw, e))?;
    Ok(Selection::new(description.trim(), odds))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Add {
            date,
            stake,
            odds,
            selections,
            result,
            unit_value,
            description,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let mut bet = match odds {
                Some(odds) if selections.is_empty() => NewBet::single(date, stake, odds),
                _ => NewBet::combined(date, stake, selections),
            };
            bet.result = result;
            bet.unit_value = unit_value.or(config.ledger.default_unit_value);
            bet.description = description;
            add_bet(config, bet).await
        }
        Commands::Settle { id, result } => settle_bet(config, id, &result).await,
        Commands::Delete { id } => delete_bet(config, id).await,
        Commands::List => list_bets(config).await,
        Commands::Import { file } => import_bets(config, file).await,
        Commands::Stats { from, to } => show_stats(config, from, to).await,
        Commands::Daily { month } => show_daily(config, month).await,
        Commands::Monthly => show_monthly(config).await,
        Commands::Surebet {
            odds_a,
            odds_b,
            investment,
            max_a,
            max_b,
            commission_a,
            commission_b,
        } => {
            let leg_a = ArbitrageLeg {
                odds: odds_a,
                max_stake: max_a,
                commission: commission_a,
            };
            let leg_b = ArbitrageLeg {
                odds: odds_b,
                max_stake: max_b,
                commission: commission_b,
            };
            let investment = investment.unwrap_or(config.surebet.default_investment);
            calculate_surebet(&config, SurebetRequest::new(leg_a, leg_b, investment))
        }
        Commands::Serve { port } => serve(config, port).await,
    }
}

async fn open_store(config: &Config) -> anyhow::Result<SqliteBetStore> {
    Ok(SqliteBetStore::connect(&config.database.resolved_path()).await?)
}

fn result_label(bet: &Bet) -> String {
    bet.result
        .map_or_else(|| "PENDING".to_string(), |r| r.to_string())
}

async fn add_bet(config: Config, bet: NewBet) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let bet = store.insert(bet).await?;

    println!("✅ Recorded bet {}", bet.id);
    println!(
        "   {} | stake {:.2} {} @ {} | {} | profit {:.2}",
        bet.date,
        bet.stake,
        config.ledger.currency,
        bet.odds,
        result_label(&bet),
        bet.profit_currency
    );
    for selection in &bet.selections {
        println!("   - {} @ {}", selection.description, selection.odds);
    }
    Ok(())
}

async fn settle_bet(config: Config, id: Uuid, result: &str) -> anyhow::Result<()> {
    let result = match result.to_ascii_lowercase().as_str() {
        "pending" | "none" => None,
        other => Some(other.parse::<BetResult>().map_err(anyhow::Error::msg)?),
    };

    let store = open_store(&config).await?;
    let bet = store.set_result(id, result).await?;
    println!(
        "✅ Bet {} is now {} (profit {:.2} {}, {:.2} units)",
        bet.id,
        result_label(&bet),
        bet.profit_currency,
        config.ledger.currency,
        bet.profit_units
    );
    Ok(())
}

async fn delete_bet(config: Config, id: Uuid) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    store.delete(id).await?;
    println!("🗑️  Deleted bet {}", id);
    Ok(())
}

async fn list_bets(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let bets = store.list().await?;

    println!("\n📒 {} bets\n", bets.len());
    println!(
        "{:<36} {:<10} {:>10} {:>8} {:<10} {:>10} {:>8}",
        "ID", "Date", "Stake", "Odds", "Result", "Profit", "Units"
    );
    println!("{}", "-".repeat(100));

    for bet in &bets {
        println!(
            "{:<36} {:<10} {:>10.2} {:>8.2} {:<10} {:>10.2} {:>8.2}",
            bet.id,
            bet.date,
            bet.stake,
            bet.odds,
            result_label(bet),
            bet.profit_currency,
            bet.profit_units
        );
        if let Some(description) = &bet.description {
            println!("    {}", description);
        }
    }
    Ok(())
}

async fn import_bets(config: Config, file: PathBuf) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&file).await?;
    let bets: Vec<Bet> = serde_json::from_str(&raw)?;

    let store = open_store(&config).await?;
    let count = store.import(bets).await?;
    println!("✅ Imported {} bets from {}", count, file.display());
    Ok(())
}

async fn show_stats(
    config: Config,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let bets = stats::in_period(&store.list().await?, from, to);
    let summary = stats::aggregate(&bets);
    let currency = &config.ledger.currency;

    println!("\n📊 Betting Statistics\n");
    match (from, to) {
        (None, None) => println!("Period: all time"),
        (from, to) => println!(
            "Period: {} to {}",
            from.map_or_else(|| "start".to_string(), |d| d.to_string()),
            to.map_or_else(|| "today".to_string(), |d| d.to_string())
        ),
    }
    println!(
        "Bets: {} ({} won, {} lost, {} refunded, {} pending)",
        summary.total, summary.won, summary.lost, summary.refunded, summary.pending
    );
    println!("Hit rate: {:.2}%", summary.hit_rate);
    println!("Profit: {:.2} {} ({:.2} units)", summary.profit_currency, currency, summary.profit_units);
    println!("Staked: {:.2} {}", summary.total_staked, currency);
    println!("ROI: {:.2}%", summary.roi);
    Ok(())
}

async fn show_daily(config: Config, month: Option<MonthKey>) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let daily = stats::daily_buckets(&store.list().await?);

    let (label, days) = match month.and_then(|m| m.first_day().map(|d| (m, d))) {
        Some((m, reference)) => (m, stats::fill_gaps(&daily, reference)),
        None => {
            let today = Local::now().date_naive();
            (MonthKey::of(today), stats::fill_gaps(&daily, today))
        }
    };

    println!("\n📅 {}\n", label);
    println!("{:<10} {:>5} {:>12} {:>8}", "Date", "Bets", "Profit", "Units");
    println!("{}", "-".repeat(40));
    for day in &days {
        println!(
            "{:<10} {:>5} {:>12.2} {:>8.2}",
            day.date, day.bets, day.profit_currency, day.profit_units
        );
    }

    let total: Decimal = days.iter().map(|d| d.profit_currency).sum();
    println!("{}", "-".repeat(40));
    println!("Month total: {:.2} {}", total, config.ledger.currency);
    Ok(())
}

async fn show_monthly(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let monthly = stats::monthly_buckets(&store.list().await?);

    println!("\n📆 Monthly results\n");
    println!("{:<8} {:>5} {:>12} {:>8} {:>12}", "Month", "Bets", "Profit", "Units", "Running");
    println!("{}", "-".repeat(50));

    let mut running = Decimal::ZERO;
    for month in &monthly {
        running += month.profit_currency;
        println!(
            "{:<8} {:>5} {:>12.2} {:>8.2} {:>12.2}",
            month.month.to_string(),
            month.bets,
            month.profit_currency,
            month.profit_units,
            running
        );
    }
    Ok(())
}

fn calculate_surebet(config: &Config, request: SurebetRequest) -> anyhow::Result<()> {
    let outcome = surebet::solve(&request)?;
    let currency = &config.ledger.currency;

    println!("\n🎯 Surebet\n");
    println!(
        "Odds: A {} / B {}  (effective {:.4} / {:.4})",
        request.leg_a.odds,
        request.leg_b.odds,
        request.leg_a.effective_odds(),
        request.leg_b.effective_odds()
    );
    println!("Implied probability: {:.2}%", outcome.surebet_percentage);

    if !outcome.is_opportunity {
        println!("\n❌ No arbitrage: the combined implied probability is not below 100%");
        return Ok(());
    }

    if let Some(side) = outcome.pinned {
        println!("Leg {:?} is at its max stake; investment adjusted", side);
    }
    println!("\nStake A: {:.2} {}", outcome.stake_a, currency);
    println!("Stake B: {:.2} {}", outcome.stake_b, currency);
    println!("Total:   {:.2} {}", outcome.total_investment, currency);
    println!(
        "\n✅ Guaranteed profit: {:.2} {} (A wins: {:.2}, B wins: {:.2})",
        outcome.guaranteed_profit, currency, outcome.profit_a, outcome.profit_b
    );
    Ok(())
}

async fn serve(config: Config, port: Option<u16>) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let repo: Arc<dyn BetRepository> = Arc::new(store);
    let state = Arc::new(DashboardState::new(repo));

    start_dashboard(state, port.unwrap_or(config.dashboard.port))
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
