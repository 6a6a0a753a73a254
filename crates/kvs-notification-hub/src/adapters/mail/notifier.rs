//! Mail node of the notifier chain.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{DomainError, Recipient, SessionResult};
use crate::ports::{MailTransport, Notifier};

/// Contact-map keys the mail notifier recognises. The Cyrillic spellings
/// are part of the contract.
pub const MAIL_CONTACT_KEYS: [&str; 6] = [
    "mail",
    "email",
    "e-mail",
    "почта",
    "электронная почта",
    "почтовый ящик",
];

const SUBJECT_PREFIX: &str = "Результаты тестирования для студента";

pub struct MailNotifier {
    transport: Arc<dyn MailTransport>,
    next: Option<Arc<dyn Notifier>>,
}

impl MailNotifier {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport,
            next: None,
        }
    }

    fn mail_address<'a>(&self, recipient: &'a Recipient) -> Option<&'a str> {
        MAIL_CONTACT_KEYS
            .iter()
            .find_map(|key| recipient.contacts().get(*key))
            .map(String::as_str)
    }

    fn render_body(result: &SessionResult) -> String {
        let mut answers = String::new();
        for (question, selections) in &result.user_answers {
            answers.push_str(&format!(
                "Вопрос: {}. Ответ пользователя: {}\n",
                question,
                selections.join(";")
            ));
        }

        let mut body = format!("Topics: \n{}\n\n", result.topics.join(";\n"));
        body.push_str(&format!("Answer:\n{}\n\n", answers.trim()));
        body.push_str(&format!("IsExpired: {}\n\n", result.is_expired));
        body.push_str(&format!("IsSuccess: {}\n\n", result.is_success));
        body.push_str(&format!("Resume: {}\n", result.resume));
        body
    }

    async fn forward(
        &self,
        result: &SessionResult,
        recipient: &Recipient,
    ) -> Option<Result<(), DomainError>> {
        match self.next() {
            Some(next) => Some(next.notify(result, recipient).await),
            None => None,
        }
    }
}

#[async_trait]
impl Notifier for MailNotifier {
    async fn notify(
        &self,
        result: &SessionResult,
        recipient: &Recipient,
    ) -> Result<(), DomainError> {
        info!("mail notify started");

        let Some(to) = self.mail_address(recipient) else {
            warn!("recipient mail address not found");
            return match self.forward(result, recipient).await {
                Some(outcome) => outcome,
                None => {
                    warn!("mail notifier is last, message will not be sent");
                    Ok(())
                }
            };
        };

        let subject = format!("{SUBJECT_PREFIX}: {}", result.user_id());
        let body = Self::render_body(result);

        match self.transport.send(to, &subject, &body).await {
            Ok(()) => {
                info!("notification by email sent successfully");
                Ok(())
            }
            Err(e) => {
                let err = e.context("failed to send email");
                warn!("{err}");
                match self.forward(result, recipient).await {
                    Some(outcome) => outcome,
                    None => Err(err),
                }
            }
        }
    }

    fn next(&self) -> Option<&dyn Notifier> {
        self.next.as_deref()
    }

    fn set_next(&mut self, next: Arc<dyn Notifier>) {
        self.next = Some(next);
    }
}
