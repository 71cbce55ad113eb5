// Logging module - Logging infrastructure
use crate::domain::config::PollerConfig;
use crate::domain::error::{ScaleError, ScaleResult};
use std::io;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging system at `config.log_level`.
///
/// `RUST_LOG` wins over the configured level. Fails if a global subscriber
/// is already installed.
pub fn init_logging(config: &PollerConfig) -> ScaleResult<()> {
    let level = parse_level(&config.log_level);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .map_err(|e| ScaleError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::info!(%level, port = %config.port_name, "Scale poller logging initialized");
    Ok(())
}

/// Map a configured level name to a tracing level; unknown names fall back to INFO
fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}

fn default_directive(level: Level) -> String {
    format!("scale_poller={},warn", level.as_str().to_ascii_lowercase())
}
