//! Monitoring surface: the read-only dashboard API

pub mod dashboard;

pub use dashboard::{create_router, start_dashboard, ApiError, DashboardState};
