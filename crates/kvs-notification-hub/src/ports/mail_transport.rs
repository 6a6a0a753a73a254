//! Outbound mail transport port.

use async_trait::async_trait;

use crate::domain::DomainError;

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DomainError>;
}
