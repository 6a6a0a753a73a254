//! Application layer: message delivery orchestration.

mod message_service;

pub use message_service::MessageService;
