//! Delivers a finished-session result to its user.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::{DomainError, SessionResult};
use crate::ports::{Notifier, RecipientSource};

pub struct MessageService {
    notifier: Arc<dyn Notifier>,
    recipients: Arc<dyn RecipientSource>,
}

impl MessageService {
    pub fn new(notifier: Arc<dyn Notifier>, recipients: Arc<dyn RecipientSource>) -> Self {
        Self {
            notifier,
            recipients,
        }
    }

    /// Resolves the recipient and walks the notifier chain.
    pub async fn send_message(&self, result: &SessionResult) -> Result<(), DomainError> {
        info!(user_id = result.user_id(), "SendMessage started");

        let recipient = self
            .recipients
            .get_recipient_by_id(result.user_id())
            .await
            .map_err(|e| {
                let err = e.context("failed to get recipient");
                error!("{err}");
                err
            })?;

        self.notifier
            .notify(result, &recipient)
            .await
            .map_err(|e| {
                let err = e.context("failed to notify recipient");
                error!("{err}");
                err
            })?;

        info!(user_id = result.user_id(), "SendMessage completed");
        Ok(())
    }
}
