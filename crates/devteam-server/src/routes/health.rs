//! Health endpoint with pool statistics

use axum::{extract::State, http::StatusCode, Json};
use devteam_connection::{ping, PoolStats};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    pool: PoolStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    database_latency_ms: Option<u64>,
}

/// GET /health - pool statistics plus a database round trip
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let pool = state.db().pool();

    let latency = match pool.acquire().await {
        Ok(conn) => ping(&*conn).await.ok(),
        Err(e) => {
            tracing::error!(error = %e, "health check could not acquire a connection");
            None
        }
    };

    let response = HealthResponse {
        status: if latency.is_some() { "ok" } else { "degraded" },
        pool: pool.stats(),
        database_latency_ms: latency.map(|d| d.as_millis() as u64),
    };

    let code = if latency.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}
