//! JetStream adapter for finished-session events.

mod publisher;

pub use publisher::{NatsSessionPublisher, SESSION_FINISHED_EVENT_TYPE};
