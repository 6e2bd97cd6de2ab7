use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::{Map, Value};

/// Prometheus text exposition
pub async fn get_metrics() -> impl IntoResponse {
    match crate::metrics::gather_metrics() {
        Ok(metrics) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            metrics,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to gather metrics: {}", e),
        )
            .into_response(),
    }
}

/// Counter values keyed by metric name, then by `network` label
/// (`"total"` for unlabelled counters).
pub async fn get_metrics_json() -> impl IntoResponse {
    let families = match crate::metrics::gather_metric_families() {
        Ok(families) => families,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to gather metrics: {}", e),
            )
                .into_response();
        }
    };

    let mut body = Map::new();
    for family in &families {
        let mut values = Map::new();
        for metric in family.get_metric() {
            let key = metric
                .get_label()
                .iter()
                .find(|label| label.get_name() == "network")
                .map(|label| label.get_value().to_string())
                .unwrap_or_else(|| "total".to_string());
            values.insert(key, Value::from(metric.get_counter().get_value()));
        }
        body.insert(family.get_name().to_string(), Value::Object(values));
    }

    (StatusCode::OK, Json(Value::Object(body))).into_response()
}
