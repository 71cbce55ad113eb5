use thiserror::Error;

/// Scale poller unified error type
#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Displays only the transport's reason so it can be forwarded as-is
    #[error("{reason}")]
    PortOpen { port: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type ScaleResult<T> = Result<T, ScaleError>;
