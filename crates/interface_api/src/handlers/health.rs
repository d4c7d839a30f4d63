//! Health check handler

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Date the server applies to issue-date rules
    pub today: NaiveDate,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        today: state.clock.today(),
    })
}
