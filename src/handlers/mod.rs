pub mod ipn;
pub mod payments;

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub transactions: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Transaction store unavailable", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (status_code, status, transactions) = match state.repository.count().await {
        Ok(count) => (StatusCode::OK, "healthy", count),
        Err(e) => {
            tracing::error!(error = %e, "Transaction store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", 0)
        }
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        transactions,
    };

    (status_code, Json(response))
}
