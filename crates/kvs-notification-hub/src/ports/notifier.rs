//! Notifier chain port.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{DomainError, Recipient, SessionResult};

/// One node of the notification chain.
///
/// A node either delivers the result through its own transport or forwards
/// to the next node. The last node's failure surfaces to the caller; a
/// terminal node that cannot deliver simply gives up.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        result: &SessionResult,
        recipient: &Recipient,
    ) -> Result<(), DomainError>;

    fn next(&self) -> Option<&dyn Notifier>;

    fn set_next(&mut self, next: Arc<dyn Notifier>);
}
