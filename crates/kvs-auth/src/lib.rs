//! KVS auth service.
//!
//! Issues bearer tokens for valid credentials, manages user records, and
//! answers introspection calls from the other services.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
