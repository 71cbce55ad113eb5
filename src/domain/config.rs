use crate::domain::error::{ScaleError, ScaleResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Baud rate spoken by the weighing terminal. Not configurable.
pub const BAUD_RATE: u32 = 9600;

/// Request for exactly one weight reading
pub const POLL_COMMAND: &[u8] = b"P\r\n";

/// Poller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Serial port identifier (e.g. `/dev/ttyUSB0` or `COM3`)
    pub port_name: String,
    /// Pause between poll cycles in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Semi-blocking read timeout handed to the transport
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    /// Bytes requested per read call while accumulating a frame
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,
    /// Live buffer per subscriber before it starts lagging
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Level used by `init_logging` when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions
fn default_poll_interval() -> u64 {
    100
}

fn default_read_timeout() -> u64 {
    500
}

fn default_read_chunk_size() -> usize {
    8
}

fn default_event_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PollerConfig {
    /// Default configuration for the given port
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            poll_interval_ms: default_poll_interval(),
            read_timeout_ms: default_read_timeout(),
            read_chunk_size: default_read_chunk_size(),
            event_capacity: default_event_capacity(),
            log_level: default_log_level(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Reject values the poll loop cannot run with
    pub fn validate(&self) -> ScaleResult<()> {
        if self.port_name.trim().is_empty() {
            return Err(ScaleError::Config {
                message: "port_name must not be empty".to_string(),
            });
        }
        if self.read_chunk_size == 0 {
            return Err(ScaleError::Config {
                message: "read_chunk_size must be at least 1".to_string(),
            });
        }
        if self.read_timeout_ms == 0 {
            return Err(ScaleError::Config {
                message: "read_timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ScaleError::Config {
                message: "event_capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Replace zero timeout, chunk size and capacity with their defaults.
    ///
    /// A zero read timeout would spin the accumulation loop and a zero
    /// capacity cannot back a broadcast channel. An empty port name is kept;
    /// opening it fails and is reported as `OpenError`.
    pub fn sanitized(mut self) -> Self {
        if let Err(e) = self.validate() {
            warn!(port = %self.port_name, "{}; falling back to defaults", e);
        }
        if self.read_timeout_ms == 0 {
            self.read_timeout_ms = default_read_timeout();
        }
        if self.read_chunk_size == 0 {
            self.read_chunk_size = default_read_chunk_size();
        }
        if self.event_capacity == 0 {
            self.event_capacity = default_event_capacity();
        }
        self
    }
}
