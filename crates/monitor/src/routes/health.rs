use crate::{handlers::health, state::AppState};
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health::get_health))
}
