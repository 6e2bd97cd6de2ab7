use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use std::path::PathBuf;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level '{level}': {source}")]
    InvalidLogLevel {
        level: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to create log directory or file appender: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Configuration for logging initialization
pub struct LoggingConfig<'a> {
    pub level: &'a str,
    pub json_format: bool,
    pub strip_ansi: bool,
    pub write_to_file: bool,
    pub write_path: &'a str,
    pub write_max_file_size: u64,
    pub write_max_files: usize,
}

impl<'a> From<&'a config::LogConfig> for LoggingConfig<'a> {
    fn from(log: &'a config::LogConfig) -> Self {
        Self {
            level: &log.level,
            json_format: log.json,
            strip_ansi: log.strip_ansi,
            write_to_file: log.write,
            write_path: &log.write_path,
            write_max_file_size: log.write_max_file_size,
            write_max_files: log.write_max_files,
        }
    }
}

/// Build the `EnvFilter` for a configured level.
///
/// `"alerts"` keeps the service at `info` while surfacing the alert log
/// target at `debug`.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    let filter_level = if level == "alerts" {
        "info,alerts=debug"
    } else {
        level
    };

    EnvFilter::try_new(filter_level).map_err(|source| LoggingError::InvalidLogLevel {
        level: level.to_string(),
        source,
    })
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn console_layer(config: &LoggingConfig) -> BoxedLayer {
    if config.json_format {
        return fmt::layer().json().boxed();
    }

    fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(!config.strip_ansi)
        .boxed()
}

/// Size-rotated `logs.log` under `write_path`. Keeps `write_max_files`
/// files including the current one (`logs.log`, `logs.log.1`, ...).
fn file_layer(config: &LoggingConfig) -> Result<(BoxedLayer, WorkerGuard), LoggingError> {
    std::fs::create_dir_all(config.write_path)?;

    let appender = BasicRollingFileAppender::new(
        PathBuf::from(config.write_path).join("logs.log"),
        RollingConditionBasic::new().max_size(config.write_max_file_size),
        config.write_max_files.saturating_sub(1),
    )?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = if config.json_format {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    };

    Ok((layer, guard))
}

/// Install the global subscriber.
///
/// With file output enabled the returned guard flushes pending lines on
/// drop and has to be held for the life of the process.
///
/// # Examples
/// ```no_run
/// use account_monitor::logging::{self, LoggingConfig};
///
/// let _guard = logging::init_with_config(LoggingConfig {
///     level: "alerts",
///     json_format: false,
///     strip_ansi: false,
///     write_to_file: true,
///     write_path: "./logs",
///     write_max_file_size: 5242880,
///     write_max_files: 5,
/// })?;
/// # Ok::<(), account_monitor::logging::LoggingError>(())
/// ```
pub fn init_with_config(config: LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = build_filter(config.level)?;

    let mut layers = vec![console_layer(&config)];
    let mut guard = None;
    if config.write_to_file {
        let (layer, file_guard) = file_layer(&config)?;
        layers.push(layer);
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    Ok(guard)
}
