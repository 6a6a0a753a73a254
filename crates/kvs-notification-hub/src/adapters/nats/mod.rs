//! JetStream consumer for finished-session events.

mod consumer;

pub use consumer::{NatsConsumer, SESSION_CONSUMER, SESSION_STREAM, SESSION_SUBJECTS};
