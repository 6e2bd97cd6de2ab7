mod args;
mod error;
mod http;
mod log;
mod metrics;
mod notify;
mod schedule;
mod storage;

pub use args::Args;
pub use error::ConfigError;
pub use http::HttpConfig;
pub use log::LogConfig;
pub use metrics::{MetricsConfig, MetricsError};
pub use notify::NotifyConfig;
pub use schedule::ScheduleConfig;
pub use storage::StorageConfig;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "AM_";

/// Flat view of the `AM_*` environment, split into sections by [`MonitorConfig`].
#[derive(Debug, Deserialize)]
struct EnvConfig {
    #[serde(default = "log::default_level")]
    log_level: String,
    #[serde(default)]
    log_json: bool,
    #[serde(default)]
    log_strip_ansi: bool,
    #[serde(default)]
    log_write: bool,
    #[serde(default = "log::default_write_path")]
    log_write_path: String,
    #[serde(default = "log::default_write_max_file_size")]
    log_write_max_file_size: u64,
    #[serde(default = "log::default_write_max_files")]
    log_write_max_files: usize,

    #[serde(default = "schedule::default_balance_interval_secs")]
    balance_interval_secs: u64,
    #[serde(default = "schedule::default_discovery_interval_secs")]
    discovery_interval_secs: u64,
    #[serde(default = "schedule::default_max_concurrent_networks")]
    max_concurrent_networks: usize,

    #[serde(default = "notify::default_enabled")]
    enable_notifications: bool,
    #[serde(default = "notify::default_min_balance_change")]
    min_balance_change: f64,
    #[serde(default)]
    webhook_url: Option<String>,

    #[serde(default = "storage::default_registry_path")]
    registry_path: String,
    #[serde(default)]
    ledger_path: Option<String>,

    #[serde(default = "http::default_host")]
    http_host: String,
    #[serde(default = "http::default_port")]
    http_port: u16,

    #[serde(default)]
    metrics_enabled: bool,
    #[serde(default = "metrics::default_prometheus_prefix")]
    metrics_prefix: String,
}

impl From<EnvConfig> for MonitorConfig {
    fn from(env: EnvConfig) -> Self {
        Self {
            log: LogConfig {
                level: env.log_level,
                json: env.log_json,
                strip_ansi: env.log_strip_ansi,
                write: env.log_write,
                write_path: env.log_write_path,
                write_max_file_size: env.log_write_max_file_size,
                write_max_files: env.log_write_max_files,
            },
            schedule: ScheduleConfig {
                balance_interval: Duration::from_secs(env.balance_interval_secs),
                discovery_interval: Duration::from_secs(env.discovery_interval_secs),
                max_concurrent_networks: env.max_concurrent_networks,
            },
            notify: NotifyConfig {
                enabled: env.enable_notifications,
                min_balance_change: env.min_balance_change,
                webhook_url: env.webhook_url.filter(|url| !url.is_empty()),
            },
            storage: StorageConfig {
                registry_path: PathBuf::from(env.registry_path),
                ledger_path: env.ledger_path.map(PathBuf::from),
            },
            http: HttpConfig {
                host: env.http_host,
                port: env.http_port,
            },
            metrics: MetricsConfig {
                enabled: env.metrics_enabled,
                prometheus_prefix: env.metrics_prefix,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    pub log: LogConfig,
    pub schedule: ScheduleConfig,
    pub notify: NotifyConfig,
    pub storage: StorageConfig,
    pub http: HttpConfig,
    pub metrics: MetricsConfig,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = envy::prefixed(ENV_PREFIX).from_env::<EnvConfig>()?;
        let config = Self::from(env);
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from explicit `(KEY, value)` pairs, keys carrying the `AM_` prefix.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env = envy::prefixed(ENV_PREFIX).from_iter::<_, EnvConfig>(pairs)?;
        let config = Self::from(env);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.log.validate()?;
        self.schedule.validate()?;
        self.notify.validate()?;
        self.storage.validate()?;
        self.http.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

/// Load variables from an env file into the process environment.
///
/// A missing file is not an error; returns whether a file was loaded.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }

    dotenv::from_path(path).map_err(|source| ConfigError::EnvFileError {
        path: path.display().to_string(),
        source,
    })?;
    Ok(true)
}
