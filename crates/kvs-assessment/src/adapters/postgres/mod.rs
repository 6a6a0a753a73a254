//! PostgreSQL adapters for the question bank and session persistence.

mod question_store;
mod session_store;

pub use question_store::{PostgresQuestionStore, DEFAULT_PER_PARTITION_LIMIT};
pub use session_store::PostgresSessionStore;
