// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use lazy_static::lazy_static;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{Mutex, Once};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metrics not initialized - call init() first")]
    NotInitialized,

    #[error(transparent)]
    Prometheus(#[from] prometheus::Error),

    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

lazy_static! {
    pub static ref REGISTRY: Mutex<Option<Registry>> = Mutex::new(None);
    static ref INIT_ONCE: Once = Once::new();

    // Created without registering to the default registry
    pub static ref BALANCE_CYCLES: IntCounter = IntCounter::new(
        "balance_cycles",
        "Number of balance check cycles started"
    )
    .expect("Failed to create balance_cycles counter");

    pub static ref DISCOVERY_CYCLES: IntCounter = IntCounter::new(
        "discovery_cycles",
        "Number of network discovery cycles started"
    )
    .expect("Failed to create discovery_cycles counter");

    pub static ref BALANCE_CHANGES: IntCounterVec = IntCounterVec::new(
        Opts::new("balance_changes", "Number of balance changes recorded"),
        &["network"]
    )
    .expect("Failed to create balance_changes counter");

    pub static ref ALERTS_SENT: IntCounter = IntCounter::new(
        "alerts_sent",
        "Number of balance alerts delivered"
    )
    .expect("Failed to create alerts_sent counter");

    pub static ref CHAIN_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("chain_errors", "Number of chain transport failures"),
        &["network"]
    )
    .expect("Failed to create chain_errors counter");
}

fn build_registry(prefix: &str) -> Result<Registry, prometheus::Error> {
    let registry = Registry::new_custom(Some(prefix.to_string()), None)?;
    registry.register(Box::new(BALANCE_CYCLES.clone()))?;
    registry.register(Box::new(DISCOVERY_CYCLES.clone()))?;
    registry.register(Box::new(BALANCE_CHANGES.clone()))?;
    registry.register(Box::new(ALERTS_SENT.clone()))?;
    registry.register(Box::new(CHAIN_ERRORS.clone()))?;
    Ok(registry)
}

/// Register all counters with a registry using `prefix`. Later calls are no-ops.
pub fn init(prefix: &str) {
    INIT_ONCE.call_once(|| match build_registry(prefix) {
        Ok(registry) => {
            if let Ok(mut slot) = REGISTRY.lock() {
                *slot = Some(registry);
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to create Prometheus registry"),
    });
}

pub fn gather_metric_families() -> Result<Vec<MetricFamily>, MetricsError> {
    let guard = REGISTRY.lock().map_err(|_| MetricsError::NotInitialized)?;
    let registry = guard.as_ref().ok_or(MetricsError::NotInitialized)?;
    Ok(registry.gather())
}

/// Gather all metrics as Prometheus text format
pub fn gather_metrics() -> Result<String, MetricsError> {
    let families = gather_metric_families()?;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
