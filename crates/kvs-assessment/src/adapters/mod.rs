//! Adapters: concrete implementations of the ports.

pub mod auth;
pub mod generator;
pub mod http;
pub mod nats;
pub mod postgres;
