use crate::domain::error::{ScaleError, ScaleResult};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Byte-level handle to an open port. Dropping it closes the port.
pub trait SerialLink: Read + Write + Send {
    /// Semi-blocking read timeout: a read returns what has arrived, or times
    /// out after `timeout` if nothing has.
    fn set_read_timeout(&mut self, timeout: Duration) -> ScaleResult<()>;
}

/// Opens named ports
pub trait PortOpener: Send + Sync {
    fn open(&self, port_name: &str, baud_rate: u32) -> ScaleResult<Box<dyn SerialLink>>;
}

impl SerialLink for Box<dyn SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> ScaleResult<()> {
        self.set_timeout(timeout)?;
        Ok(())
    }
}

/// Opens real serial ports through the `serialport` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPortOpener;

impl PortOpener for SystemPortOpener {
    fn open(&self, port_name: &str, baud_rate: u32) -> ScaleResult<Box<dyn SerialLink>> {
        debug!("Opening serial port {} at {} baud", port_name, baud_rate);

        let port = serialport::new(port_name, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| ScaleError::PortOpen {
                port: port_name.to_string(),
                reason: e.description,
            })?;

        info!("Serial port {} opened", port_name);
        Ok(Box::new(port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_port_fails_gracefully() {
        let result = SystemPortOpener.open("/dev/scale-poller-does-not-exist", 9600);
        match result {
            Err(ScaleError::PortOpen { port, reason }) => {
                assert_eq!(port, "/dev/scale-poller-does-not-exist");
                assert!(!reason.is_empty());
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("opening a missing port should fail"),
        }
    }
}
