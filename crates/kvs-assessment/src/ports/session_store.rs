//! Session persistence port.

use async_trait::async_trait;

use crate::domain::{DomainError, Session};

/// Persists and restores sessions in every lifecycle state.
///
/// The stored column set varies with the session state; `get_session_by_id`
/// reconstructs the aggregate through the state constructors.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists the session in its current state. The first write inserts;
    /// a completed session updates the existing row.
    async fn store_session(&self, session: &Session) -> Result<(), DomainError>;

    /// Loads a session by id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no row exists
    /// - `Internal` on an unknown stored state tag
    async fn get_session_by_id(&self, session_id: &str) -> Result<Session, DomainError>;

    /// Lists the user's completed sessions, newest first.
    async fn get_all_completed_user_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<Session>, DomainError>;
}
