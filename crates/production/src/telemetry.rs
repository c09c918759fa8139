//! Logging initialization.
//!
//! The runner and the state machine log through `tracing`; this module
//! installs the global subscriber once per process.

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Filter applied when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,barbell=debug";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to set global subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Configuration for telemetry.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
    /// Include thread ids in log lines.
    pub thread_ids: bool,
    /// Colored output.
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_FILTER.to_string(),
            thread_ids: true,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Use `level` as the fallback filter, e.g. from a `--log-level` flag.
    pub fn with_default_filter(mut self, level: impl Into<String>) -> Self {
        self.default_filter = level.into();
        self
    }
}

/// `RUST_LOG` if set and valid, otherwise the configured default.
pub fn env_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter))
}

/// Initialize logging with the given configuration.
///
/// Log lines go to stderr. Fails if a global subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr);

    let subscriber = Registry::default().with(env_filter(config)).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
