//! Application layer: account operations.

mod account_service;

pub use account_service::{AccountManager, AccountService};
