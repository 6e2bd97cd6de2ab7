// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error(
        "Invalid Prometheus prefix '{0}': must start with [a-zA-Z_:] and contain only [a-zA-Z0-9_:]"
    )]
    InvalidPrometheusPrefix(String),
}

/// Configuration for Prometheus metrics
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Enable or disable metrics collection and the /metrics route
    ///
    /// Env: AM_METRICS_ENABLED
    /// Default: false
    pub enabled: bool,

    /// Prometheus metric name prefix
    ///
    /// Env: AM_METRICS_PREFIX
    /// Default: account_monitor
    pub prometheus_prefix: String,
}

pub(crate) fn default_prometheus_prefix() -> String {
    "account_monitor".to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prometheus_prefix: default_prometheus_prefix(),
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), MetricsError> {
        // Must match [a-zA-Z_:][a-zA-Z0-9_:]* or Prometheus drops the series
        let mut chars = self.prometheus_prefix.chars();
        if let Some(first) = chars.next() {
            if !first.is_ascii_alphabetic() && first != '_' && first != ':' {
                return Err(MetricsError::InvalidPrometheusPrefix(
                    self.prometheus_prefix.clone(),
                ));
            }

            if chars.any(|ch| !ch.is_ascii_alphanumeric() && ch != '_' && ch != ':') {
                return Err(MetricsError::InvalidPrometheusPrefix(
                    self.prometheus_prefix.clone(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_prefix(prefix: &str) -> MetricsConfig {
        MetricsConfig {
            enabled: true,
            prometheus_prefix: prefix.to_string(),
        }
    }

    #[test]
    fn test_default_metrics_config() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.prometheus_prefix, "account_monitor");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_valid_prometheus_prefixes() {
        for prefix in ["my_app_metrics", "app:metrics", "_metrics", ""] {
            assert!(with_prefix(prefix).validate().is_ok(), "{prefix} should be valid");
        }
    }

    #[test]
    fn test_invalid_prometheus_prefix_starting_with_number() {
        assert!(with_prefix("123metrics").validate().is_err());
    }

    #[test]
    fn test_invalid_prometheus_prefix_with_hyphen() {
        assert!(with_prefix("my-metrics").validate().is_err());
    }

    #[test]
    fn test_invalid_prometheus_prefix_with_special_chars() {
        assert!(with_prefix("my.metrics").validate().is_err());
    }
}
