//! Logging setup for the blobspace binaries.
//!
//! Logs go to stderr so the report printed on stdout can be piped.

use dotenvy::dotenv;
use std::{env, io::stderr, str::FromStr};
use strum::{Display, EnumString};
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    filter::LevelFilter, fmt, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

const ENV_LOG_FILE: &str = "BLOBSPACE_LOG_FILE";
const ENV_LOG_DIR: &str = "BLOBSPACE_LOG_DIR";
const ENV_LOG_FORMAT_FILE: &str = "BLOBSPACE_LOG_FORMAT_FILE";
const ENV_LOG_FORMAT_STDERR: &str = "BLOBSPACE_LOG_FORMAT_STDERR";

/// Output format of a log target.
#[derive(EnumString, Display, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// A boxed layer for tracing
pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Logging options read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// File name to write logs to. No file logging when `None`.
    pub file: Option<String>,
    /// Directory for the log file.
    pub dir: String,
    /// Format of the file target.
    pub file_format: LogFormat,
    /// Format of the stderr target.
    pub stderr_format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            dir: ".".to_string(),
            file_format: LogFormat::Json,
            stderr_format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// Read the config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from a variable lookup. Unset, empty or unparsable values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let format = |key: &str, default: LogFormat| {
            non_empty(key).and_then(|v| LogFormat::from_str(&v).ok()).unwrap_or(default)
        };

        Self {
            file: non_empty(ENV_LOG_FILE),
            dir: non_empty(ENV_LOG_DIR).unwrap_or(defaults.dir),
            file_format: format(ENV_LOG_FORMAT_FILE, defaults.file_format),
            stderr_format: format(ENV_LOG_FORMAT_STDERR, defaults.stderr_format),
        }
    }
}

/// Initialize logging.
///
/// By default this will initialize INFO text to stderr. `.env` is loaded first.
///
/// Env var options:
/// - `BLOBSPACE_LOG_FILE` - file name to write logs to. If empty, will not write logs to file.
/// - `BLOBSPACE_LOG_DIR` - directory to write logs to. If empty will write logs to current
///   directory.
/// - `BLOBSPACE_LOG_FORMAT_FILE` - logging format for file target. Defaults to `json`. One of
///   json, text.
/// - `BLOBSPACE_LOG_FORMAT_STDERR` - logging format for stderr target. Defaults to `text`. One of
///   json, text.
///
/// The returned guards must be held until exit, dropping them flushes the writers.
pub fn init_logging() -> eyre::Result<Vec<WorkerGuard>> {
    dotenv().ok();

    let config = LogConfig::from_env();

    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(stderr());

    let mut guards = vec![stderr_guard];
    let mut layers: Vec<BoxedLayer<Registry>> =
        vec![apply_layer_format(config.stderr_format, stderr_writer)];

    if let Some(file) = &config.file {
        let appender = RollingFileAppender::new(Rotation::NEVER, &config.dir, file);
        let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
        guards.push(file_guard);
        layers.push(apply_layer_format(config.file_format, file_writer));
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        log_file = ?config.file,
        log_dir = %config.dir,
        log_format_file = %config.file_format,
        log_format_stderr = %config.stderr_format,
        RUST_LOG = env::var("RUST_LOG").unwrap_or_default(),
        "Logging options configured via env vars"
    );

    Ok(guards)
}

fn apply_layer_format(log_format: LogFormat, writer: NonBlocking) -> BoxedLayer<Registry> {
    let filter =
        EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();

    match log_format {
        LogFormat::Json => fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
    }
}
