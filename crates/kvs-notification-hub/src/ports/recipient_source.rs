//! Recipient lookup port.

use async_trait::async_trait;

use crate::domain::{DomainError, Recipient};

/// Resolves a user id to a recipient with contact channels.
#[async_trait]
pub trait RecipientSource: Send + Sync {
    async fn get_recipient_by_id(&self, user_id: &str) -> Result<Recipient, DomainError>;
}
