// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::ConfigError;
use std::net::IpAddr;
use std::str::FromStr;

/// Validates that a string is a valid host (IP address or hostname)
fn is_valid_host(host: &str) -> bool {
    if IpAddr::from_str(host).is_ok() {
        return true;
    }

    // RFC 1123 hostname
    if host.is_empty() || host.len() > 253 {
        return false;
    }

    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address the health/metrics server binds to
    ///
    /// Env: AM_HTTP_HOST
    /// Default: 127.0.0.1
    pub host: String,

    /// Port the health/metrics server binds to
    ///
    /// Env: AM_HTTP_PORT
    /// Default: 8080
    pub port: u16,
}

pub(crate) fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

impl HttpConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_host(&self.host) {
            return Err(ConfigError::ValidateError(format!(
                "Invalid HTTP host '{}'",
                self.host
            )));
        }

        if self.port == 0 {
            return Err(ConfigError::ValidateError(
                "HTTP port cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_http_config() {
        let config = HttpConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_port_zero() {
        let config = HttpConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_hosts() {
        for host in ["0.0.0.0", "::1", "monitor", "monitor.svc.cluster.local"] {
            let config = HttpConfig {
                host: host.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "{host} should be valid");
        }
    }

    #[test]
    fn test_invalid_hostname_starting_with_hyphen() {
        let config = HttpConfig {
            host: "-invalid".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
