// Core module - Frame codec, event bus and the poll loop
pub mod bus;
pub mod frame;
pub mod poller;

pub use bus::{EventBus, EventStream, REPLAY_DEPTH};
pub use frame::{Frame, WeightFrame, FRAME_LEN};
pub use poller::TerminalPoller;
