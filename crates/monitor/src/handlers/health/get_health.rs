use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub connected_networks: usize,
    pub active_networks: usize,
    pub uptime_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_balance_cycle: Option<DateTime<Utc>>,
}

pub async fn get_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "ok".to_string(),
        connected_networks: state.pool.connected().await,
        active_networks: state.registry.active_networks().count(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        last_balance_cycle: *state.last_balance_cycle.read().await,
    };

    (StatusCode::OK, Json(response))
}
