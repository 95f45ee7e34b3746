//! Structured logging infrastructure.
//!
//! Centralised `tracing` subscriber initialisation with text or JSON output
//! and `RUST_LOG` based filtering.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{BootstrapStoreConfig, LogFormat};

/// Initialize the logging system with structured output.
///
/// Log level can be configured via the `RUST_LOG` environment variable.
/// If not set, defaults to `info` level.
///
/// # Example
/// ```no_run
/// use lwm2m_bootstrap_core::logging;
///
/// logging::init();
/// tracing::info!("bootstrap store started");
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .init();
}

/// Initialize the logging system with JSON output for production environments.
///
/// # Example
/// ```no_run
/// use lwm2m_bootstrap_core::logging;
///
/// logging::init_json();
/// tracing::info!(endpoint = "dev-001", "lookup served");
/// ```
pub fn init_json() {
    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(fmt::layer().json().with_target(true).with_thread_ids(true))
        .init();
}

/// Initialize logging from a loaded store configuration.
///
/// `RUST_LOG` still wins over `config.log_level` when it is set.
pub fn init_from_config(config: &BootstrapStoreConfig) {
    let filter = env_filter(&config.log_level);
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .init(),
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_fallback_doesnt_panic() {
        // Global subscriber can only be installed once per process, so only
        // the filter construction is exercised here.
        let _ = env_filter("debug");
        let _ = env_filter("lwm2m_bootstrap_security=trace");
    }
}
