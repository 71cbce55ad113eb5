// Domain module - Types shared by the poller and its consumers
pub mod config;
pub mod error;
pub mod event;
