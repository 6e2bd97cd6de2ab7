// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::{routes, state::AppState};
use axum::Router;
use tower_http::trace::TraceLayer;

/// `/health` always, `/metrics` only when metrics are enabled.
pub fn create_app(state: AppState) -> Router {
    let mut router = Router::new().merge(routes::health::routes());
    if state.config.metrics.enabled {
        router = router.merge(routes::metrics::routes());
    }
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainClient, ChainError, Connector, InMemoryChain};
    use crate::handlers::health::HealthResponse;
    use crate::ledger::MemoryLedger;
    use crate::notify::LogNotifier;
    use crate::registry::Registry;
    use crate::types::Network;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use config::MonitorConfig;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct MemoryConnector;

    #[async_trait]
    impl Connector for MemoryConnector {
        async fn connect(&self, _network: &Network) -> Result<Arc<dyn ChainClient>, ChainError> {
            Ok(Arc::new(InMemoryChain::new()))
        }
    }

    fn network(id: u32, name: &str) -> Network {
        Network {
            id,
            name: name.to_string(),
            display_name: None,
            rpc_url: format!("ws://{name}.invalid"),
            ss58_prefix: 0,
            decimals: 10,
            symbol: "DOT".to_string(),
            active: true,
        }
    }

    fn state(metrics_enabled: bool) -> AppState {
        let mut config = MonitorConfig::default();
        config.metrics.enabled = metrics_enabled;
        let registry = Registry {
            networks: vec![network(1, "polkadot"), network(2, "kusama")],
            ..Default::default()
        };
        AppState::from_parts(
            config,
            registry,
            Arc::new(MemoryConnector),
            Arc::new(MemoryLedger::new()),
            Arc::new(LogNotifier),
        )
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health_reports_connections() {
        let state = state(false);
        state.pool.get(&network(1, "polkadot")).await.unwrap();

        let (status, body) = get(create_app(state), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.connected_networks, 1);
        assert_eq!(health.active_networks, 2);
        assert!(health.last_balance_cycle.is_none());
    }

    #[tokio::test]
    async fn test_metrics_route_follows_config() {
        let (status, _) = get(create_app(state(false)), "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        crate::metrics::init("account_monitor");
        let (status, body) = get(create_app(state(true)), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("account_monitor_"));

        let (status, body) = get(create_app(state(true)), "/metrics.json").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["account_monitor_balance_cycles"]["total"].is_number());
    }
}
