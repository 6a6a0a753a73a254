//! Adapters: concrete implementations of the ports.

pub mod auth_api;
pub mod mail;
pub mod nats;
