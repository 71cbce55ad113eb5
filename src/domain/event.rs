use serde::Serialize;
use std::fmt;

/// Observable outcome of a terminal poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ScaleEvent {
    /// Port opened, poll loop starting
    PortOpened,
    /// Port could not be opened; the poller is finished
    OpenError(String),
    /// One poll cycle failed; the loop carries on
    ReadError(String),
    /// Trimmed primary weight field of a valid frame
    WeightReading(String),
}

impl ScaleEvent {
    /// Reading text for `WeightReading`, `None` otherwise
    pub fn weight(&self) -> Option<&str> {
        match self {
            ScaleEvent::WeightReading(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ScaleEvent::OpenError(_) | ScaleEvent::ReadError(_))
    }
}

impl fmt::Display for ScaleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleEvent::PortOpened => write!(f, "Port opened"),
            ScaleEvent::OpenError(cause) => write!(f, "Open error: {}", cause),
            ScaleEvent::ReadError(cause) => write!(f, "Read error: {}", cause),
            ScaleEvent::WeightReading(text) => write!(f, "Weight: {}", text),
        }
    }
}
