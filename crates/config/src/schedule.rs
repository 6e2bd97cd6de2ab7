use crate::ConfigError;
use std::time::Duration;

/// Intervals of the periodic cycles and their fan-out.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Seconds between balance checks
    ///
    /// Env: AM_BALANCE_INTERVAL_SECS
    /// Default: 86400 (24h)
    pub balance_interval: Duration,

    /// Seconds between network discovery runs
    ///
    /// Env: AM_DISCOVERY_INTERVAL_SECS
    /// Default: 1800 (30min)
    pub discovery_interval: Duration,

    /// Networks resolved concurrently during a balance cycle
    ///
    /// Env: AM_MAX_CONCURRENT_NETWORKS
    /// Default: 4
    pub max_concurrent_networks: usize,
}

pub(crate) fn default_balance_interval_secs() -> u64 {
    24 * 60 * 60
}

pub(crate) fn default_discovery_interval_secs() -> u64 {
    30 * 60
}

pub(crate) fn default_max_concurrent_networks() -> usize {
    4
}

impl ScheduleConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.balance_interval.is_zero() {
            return Err(ConfigError::ValidateError(
                "Balance interval must be greater than 0".to_string(),
            ));
        }

        if self.discovery_interval.is_zero() {
            return Err(ConfigError::ValidateError(
                "Discovery interval must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrent_networks == 0 {
            return Err(ConfigError::ValidateError(
                "Max concurrent networks must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            balance_interval: Duration::from_secs(default_balance_interval_secs()),
            discovery_interval: Duration::from_secs(default_discovery_interval_secs()),
            max_concurrent_networks: default_max_concurrent_networks(),
        }
    }
}
