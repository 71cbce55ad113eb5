//! Scripted in-memory weighing terminal used by the integration tests
#![allow(dead_code)]

use scale_poller::{PortOpener, ScaleError, ScaleEvent, ScaleResult, SerialLink};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const STEP_TIMEOUT: Duration = Duration::from_secs(3);

/// One scripted response to a read call
pub enum Step {
    Data(Vec<u8>),
    Fail(io::ErrorKind, &'static str),
}

#[derive(Default)]
struct DeviceState {
    steps: VecDeque<Step>,
    written: Vec<u8>,
    read_timeout: Option<Duration>,
    open_count: usize,
    closed: bool,
}

/// Shared view of the fake device, kept by the test after the link moves
/// into the poller
#[derive(Clone, Default)]
pub struct ScriptedDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl ScriptedDevice {
    pub fn new(steps: Vec<Step>) -> Self {
        let device = Self::default();
        device.state.lock().unwrap().steps = steps.into();
        device
    }

    pub fn push(&self, step: Step) {
        self.state.lock().unwrap().steps.push_back(step);
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().written.clone()
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.state.lock().unwrap().read_timeout
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().unwrap().open_count
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn remaining_steps(&self) -> usize {
        self.state.lock().unwrap().steps.len()
    }
}

pub struct ScriptedLink {
    device: ScriptedDevice,
}

impl Read for ScriptedLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let step = self.device.state.lock().unwrap().steps.pop_front();
        match step {
            Some(Step::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    let rest = bytes[n..].to_vec();
                    self.device.state.lock().unwrap().steps.push_front(Step::Data(rest));
                }
                Ok(n)
            }
            Some(Step::Fail(kind, message)) => Err(io::Error::new(kind, message)),
            None => {
                // Idle line: behave like a short transport read timeout
                std::thread::sleep(Duration::from_millis(5));
                Err(io::ErrorKind::TimedOut.into())
            }
        }
    }
}

impl Write for ScriptedLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.device.state.lock().unwrap().written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialLink for ScriptedLink {
    fn set_read_timeout(&mut self, timeout: Duration) -> ScaleResult<()> {
        self.device.state.lock().unwrap().read_timeout = Some(timeout);
        Ok(())
    }
}

impl Drop for ScriptedLink {
    fn drop(&mut self) {
        self.device.state.lock().unwrap().closed = true;
    }
}

pub struct ScriptedOpener {
    device: ScriptedDevice,
    failure: Option<&'static str>,
}

impl ScriptedOpener {
    pub fn new(device: ScriptedDevice) -> Self {
        Self {
            device,
            failure: None,
        }
    }

    pub fn failing(device: ScriptedDevice, reason: &'static str) -> Self {
        Self {
            device,
            failure: Some(reason),
        }
    }
}

impl PortOpener for ScriptedOpener {
    fn open(&self, port_name: &str, baud_rate: u32) -> ScaleResult<Box<dyn SerialLink>> {
        assert_eq!(baud_rate, 9600);
        if let Some(reason) = self.failure {
            return Err(ScaleError::PortOpen {
                port: port_name.to_string(),
                reason: reason.to_string(),
            });
        }
        self.device.state.lock().unwrap().open_count += 1;
        Ok(Box::new(ScriptedLink {
            device: self.device.clone(),
        }))
    }
}

/// Build a well-formed frame around a six byte weight field
pub fn frame(weight: &str) -> Vec<u8> {
    assert_eq!(weight.len(), 6);
    let mut bytes = vec![0x02, 0x00, 0x00, 0x00];
    bytes.extend_from_slice(weight.as_bytes());
    bytes.extend_from_slice(b"      ");
    bytes.push(0x0D);
    bytes.push(0x02);
    bytes
}

/// Same as `frame` but with a wrong trailing byte
pub fn bad_trailer_frame(weight: &str) -> Vec<u8> {
    let mut bytes = frame(weight);
    bytes[17] = 0x03;
    bytes
}

pub async fn next_event(events: &mut scale_poller::EventStream) -> ScaleEvent {
    tokio::time::timeout(STEP_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream closed")
}

/// Assert nothing is published for `quiet`
pub async fn assert_quiet(events: &mut scale_poller::EventStream, quiet: Duration) {
    if let Ok(event) = tokio::time::timeout(quiet, events.recv()).await {
        panic!("unexpected event: {:?}", event);
    }
}

pub async fn wait_until_closed(device: &ScriptedDevice) {
    tokio::time::timeout(STEP_TIMEOUT, async {
        while !device.is_closed() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("port was not closed");
}
