use crate::domain::event::ScaleEvent;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::warn;

/// Number of past events handed to a subscriber when it attaches
pub const REPLAY_DEPTH: usize = 3;

/// Multicast event channel that replays the most recent events to late
/// subscribers.
///
/// Publishing never waits for subscribers; a subscriber that falls more than
/// `capacity` events behind skips the oldest ones.
pub struct EventBus {
    sender: broadcast::Sender<ScaleEvent>,
    history: Mutex<VecDeque<ScaleEvent>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            history: Mutex::new(VecDeque::with_capacity(REPLAY_DEPTH)),
        }
    }

    /// Publish an event to every current subscriber and the replay buffer
    pub fn publish(&self, event: ScaleEvent) {
        // History and live send happen under one lock so a concurrent
        // subscriber sees each event exactly once.
        let mut history = self.history();
        if history.len() == REPLAY_DEPTH {
            history.pop_front();
        }
        history.push_back(event.clone());
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> EventStream {
        let history = self.history();
        EventStream {
            replay: history.clone(),
            live: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn history(&self) -> MutexGuard<'_, VecDeque<ScaleEvent>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One subscriber's view of a poller's events, oldest first
pub struct EventStream {
    replay: VecDeque<ScaleEvent>,
    live: broadcast::Receiver<ScaleEvent>,
}

impl EventStream {
    /// Wait for the next event.
    ///
    /// Returns `None` once the poller and its task are gone.
    pub async fn recv(&mut self) -> Option<ScaleEvent> {
        if let Some(event) = self.replay.pop_front() {
            return Some(event);
        }

        loop {
            match self.live.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already available
    pub fn try_recv(&mut self) -> Option<ScaleEvent> {
        if let Some(event) = self.replay.pop_front() {
            return Some(event);
        }

        loop {
            match self.live.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(_) => return None,
            }
        }
    }
}
