//! Public HTTP port.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::AppState;
pub use routes::router;
