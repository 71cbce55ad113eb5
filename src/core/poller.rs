//! Terminal poller: owns one serial port and drives the request/response loop
//! against the weighing terminal.
//!
//! Loop states, one poll cycle per pass:
//!
//! ```text
//! Idle -> Requesting -> Accumulating -> Decoding -> Sleeping -> Requesting ...
//!                            |                           |
//!                            +--------> Stopped <--------+
//! ```
//!
//! A stop request is observed at the top of Requesting, in the accumulation
//! guard and while Sleeping. An in-flight read finishes (or times out) first.

use crate::core::bus::{EventBus, EventStream};
use crate::core::frame::{Frame, WeightFrame, FRAME_LEN};
use crate::domain::config::{PollerConfig, BAUD_RATE, POLL_COMMAND};
use crate::domain::error::ScaleResult;
use crate::domain::event::ScaleEvent;
use crate::infrastructure::serial::{PortHandle, PortOpener, SystemPortOpener};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Handle to a running poller.
///
/// The poll task starts on construction. Dropping the handle requests stop.
pub struct TerminalPoller {
    port_name: String,
    bus: Arc<EventBus>,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl TerminalPoller {
    /// Poll `port_name` with default settings on the given runtime
    pub fn new(port_name: impl Into<String>, runtime: &Handle) -> Self {
        Self::with_config(PollerConfig::new(port_name), runtime)
    }

    pub fn with_config(config: PollerConfig, runtime: &Handle) -> Self {
        Self::with_opener(config, Arc::new(SystemPortOpener), runtime)
    }

    /// Poll through a custom transport.
    ///
    /// Invalid settings are logged and replaced with defaults, see
    /// [`PollerConfig::sanitized`].
    pub fn with_opener(config: PollerConfig, opener: Arc<dyn PortOpener>, runtime: &Handle) -> Self {
        let config = config.sanitized();
        let bus = Arc::new(EventBus::new(config.event_capacity));
        let (stop_tx, stop_rx) = watch::channel(false);
        let port_name = config.port_name.clone();

        let poll_task = PollTask {
            config,
            opener,
            bus: Arc::clone(&bus),
            stop_rx,
        };
        let task = runtime.spawn(poll_task.run());

        Self {
            port_name,
            bus,
            stop_tx,
            task: Some(task),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn baud_rate(&self) -> u32 {
        BAUD_RATE
    }

    /// Subscribe to this poller's events.
    ///
    /// The last three events published before subscribing are replayed first.
    pub fn events(&self) -> EventStream {
        self.bus.subscribe()
    }

    /// Ask the poll loop to stop and close the port. Safe to call repeatedly
    /// and from any thread.
    pub fn stop(&self) {
        let first = self.stop_tx.send_if_modified(|stopped| !std::mem::replace(stopped, true));
        if first {
            info!("Stop requested for poller on {}", self.port_name);
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Stop and wait until the poll task has exited and the port is closed
    pub async fn shutdown(mut self) -> ScaleResult<()> {
        self.stop();
        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(())
    }
}

impl Drop for TerminalPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

enum CycleOutcome {
    Reading(WeightFrame),
    Malformed,
    Cancelled,
}

struct PollTask {
    config: PollerConfig,
    opener: Arc<dyn PortOpener>,
    bus: Arc<EventBus>,
    stop_rx: watch::Receiver<bool>,
}

impl PollTask {
    async fn run(mut self) {
        let port = match self.open().await {
            Ok(port) => port,
            Err(e) => {
                warn!("Failed to open {}: {}", self.config.port_name, e);
                if !self.is_cancelled() {
                    self.bus.publish(ScaleEvent::OpenError(e.to_string()));
                }
                return;
            }
        };

        if self.is_cancelled() {
            debug!("Poller on {} stopped while opening", self.config.port_name);
            return;
        }

        self.bus.publish(ScaleEvent::PortOpened);
        self.poll(&port).await;

        // `port` drops here, closing the link
        info!("Poll loop on {} stopped", self.config.port_name);
    }

    async fn open(&self) -> ScaleResult<PortHandle> {
        let opener = Arc::clone(&self.opener);
        let port_name = self.config.port_name.clone();
        let read_timeout = self.config.read_timeout();

        task::spawn_blocking(move || -> ScaleResult<PortHandle> {
            let mut link = opener.open(&port_name, BAUD_RATE)?;
            link.set_read_timeout(read_timeout)?;
            Ok(PortHandle::new(link))
        })
        .await?
    }

    async fn poll(&mut self, port: &PortHandle) {
        while !self.is_cancelled() {
            let outcome = self.cycle(port).await;
            if self.is_cancelled() {
                break;
            }

            match outcome {
                Ok(CycleOutcome::Reading(frame)) => {
                    debug!("Weight {:?} (secondary {:?})", frame.weight, frame.secondary);
                    self.bus.publish(ScaleEvent::WeightReading(frame.weight));
                }
                Ok(CycleOutcome::Malformed) => {}
                Ok(CycleOutcome::Cancelled) => break,
                Err(e) => {
                    warn!("Poll cycle on {} failed: {}", self.config.port_name, e);
                    self.bus.publish(ScaleEvent::ReadError(e.to_string()));
                }
            }

            if !self.pause().await {
                break;
            }
        }
    }

    /// One request, accumulate and decode pass
    async fn cycle(&self, port: &PortHandle) -> ScaleResult<CycleOutcome> {
        port.send(POLL_COMMAND).await?;

        let frame = match self.accumulate(port).await? {
            Some(frame) => frame,
            None => return Ok(CycleOutcome::Cancelled),
        };

        match frame.decode() {
            Some(decoded) => Ok(CycleOutcome::Reading(decoded)),
            None => {
                debug!("Discarding malformed frame {}", hex::encode(frame.as_bytes()));
                Ok(CycleOutcome::Malformed)
            }
        }
    }

    /// Read chunks until a full frame is buffered. `None` if stopped first.
    async fn accumulate(&self, port: &PortHandle) -> ScaleResult<Option<Frame>> {
        let chunk_size = self.config.read_chunk_size.max(1);
        let mut pending = Vec::with_capacity(FRAME_LEN + chunk_size);

        while pending.len() < FRAME_LEN {
            if self.is_cancelled() {
                return Ok(None);
            }
            let chunk = port.read_chunk(chunk_size).await?;
            pending.extend_from_slice(&chunk);
        }

        if pending.len() > FRAME_LEN {
            debug!(
                "Dropping {} bytes past the frame boundary",
                pending.len() - FRAME_LEN
            );
        }
        Ok(Frame::from_accumulated(&pending))
    }

    /// Sleep between cycles. Returns `false` if a stop arrived meanwhile.
    async fn pause(&mut self) -> bool {
        let interval = self.config.poll_interval();
        let interrupted = tokio::select! {
            _ = tokio::time::sleep(interval) => false,
            _ = self.stop_rx.changed() => true,
        };
        !interrupted && !self.is_cancelled()
    }

    fn is_cancelled(&self) -> bool {
        *self.stop_rx.borrow()
    }
}
