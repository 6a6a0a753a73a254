//! Finished-session event port.

use async_trait::async_trait;

use crate::domain::{DomainError, SessionResult};

/// Publishes the result of a completed session to the bus.
#[async_trait]
pub trait SessionEventPublisher: Send + Sync {
    async fn session_finished(&self, result: &SessionResult) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_event_publisher_is_object_safe() {
        fn _accepts_dyn(_publisher: &dyn SessionEventPublisher) {}
    }
}
