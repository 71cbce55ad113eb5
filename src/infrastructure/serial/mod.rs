// Serial module - Transport seam over the serialport crate
pub mod link;
pub mod port;

pub use link::{PortOpener, SerialLink, SystemPortOpener};
pub use port::PortHandle;
