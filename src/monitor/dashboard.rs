//! Ledger dashboard API
//!
//! Read-only HTTP endpoints serving the figures the stats core derives from
//! the stored bets, plus the surebet calculator. Every request recomputes
//! from a fresh snapshot of the repository.

use crate::error::LedgerError;
use crate::stats::{
    self, cumulative, daily_buckets, fill_current_month, fill_gaps, monthly_buckets,
    CumulativePoint, DailyStats, DashboardStats, MonthKey, MonthlyStats,
};
use crate::storage::BetRepository;
use crate::surebet::{self, SurebetOutcome, SurebetRequest};
use crate::types::{parse_bet_date, Bet};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Dashboard state shared across handlers
pub struct DashboardState {
    pub repo: Arc<dyn BetRepository>,
}

impl DashboardState {
    pub fn new(repo: Arc<dyn BetRepository>) -> Self {
        Self { repo }
    }

    async fn bets(&self) -> Result<Vec<Bet>, ApiError> {
        Ok(self.repo.list().await?)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Error response: a status plus a JSON `{"error": ...}` body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Dashboard request failed: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

fn parse_bound(raw: Option<&str>, name: &str) -> Result<Option<NaiveDate>, ApiError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(parse_bet_date)
        .transpose()
        .map_err(|e| ApiError::bad_request(format!("{}: {}", name, e)))
}

// ============ HTTP API Handlers ============

/// Health check
async fn health_check() -> &'static str {
    "OK"
}

/// All bets, oldest first
async fn get_bets(State(state): State<Arc<DashboardState>>) -> Result<Json<Vec<Bet>>, ApiError> {
    Ok(Json(state.bets().await?))
}

/// Summary cards, optionally limited to a date range
async fn get_stats(
    State(state): State<Arc<DashboardState>>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DashboardStats>, ApiError> {
    let from = parse_bound(query.from.as_deref(), "from")?;
    let to = parse_bound(query.to.as_deref(), "to")?;

    let bets = state.bets().await?;
    let bets = stats::in_period(&bets, from, to);
    Ok(Json(stats::aggregate(&bets)))
}

/// Daily series for one month, zero-filled
async fn get_daily(
    State(state): State<Arc<DashboardState>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<DailyStats>>, ApiError> {
    let month = query
        .month
        .as_deref()
        .map(str::parse::<MonthKey>)
        .transpose()
        .map_err(ApiError::bad_request)?;

    let daily = daily_buckets(&state.bets().await?);
    let filled = match month.and_then(|m| m.first_day()) {
        Some(reference) => fill_gaps(&daily, reference),
        None => fill_current_month(&daily),
    };
    Ok(Json(filled))
}

/// Monthly series, chronological
async fn get_monthly(
    State(state): State<Arc<DashboardState>>,
) -> Result<Json<Vec<MonthlyStats>>, ApiError> {
    Ok(Json(monthly_buckets(&state.bets().await?)))
}

/// Running profit over every day with activity
async fn get_cumulative(
    State(state): State<Arc<DashboardState>>,
) -> Result<Json<Vec<CumulativePoint>>, ApiError> {
    let daily = daily_buckets(&state.bets().await?);
    Ok(Json(cumulative(&daily)))
}

/// Surebet calculator
async fn post_surebet(Json(request): Json<SurebetRequest>) -> Result<Json<SurebetOutcome>, ApiError> {
    match surebet::solve(&request) {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            tracing::warn!("Rejected surebet request: {}", e);
            Err(LedgerError::from(e).into())
        }
    }
}

/// Create dashboard router
pub fn create_router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/bets", get(get_bets))
        .route("/stats", get(get_stats))
        .route("/daily", get(get_daily))
        .route("/monthly", get(get_monthly))
        .route("/cumulative", get(get_cumulative))
        .route("/surebet", post(post_surebet))
        .with_state(state)
}

/// Start dashboard server
pub async fn start_dashboard(
    state: Arc<DashboardState>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Dashboard server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
