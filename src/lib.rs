//! Scale Poller Library
//!
//! Polls a serial-attached weighing terminal for its current weight, decodes
//! the fixed 18-byte response frame and publishes readings and lifecycle
//! events to any number of subscribers.

pub mod core;
pub mod domain;
pub mod infrastructure;

pub use self::core::{EventStream, Frame, TerminalPoller, WeightFrame};
pub use domain::config::{PollerConfig, BAUD_RATE};
pub use domain::error::{ScaleError, ScaleResult};
pub use domain::event::ScaleEvent;
pub use infrastructure::serial::{PortOpener, SerialLink, SystemPortOpener};
