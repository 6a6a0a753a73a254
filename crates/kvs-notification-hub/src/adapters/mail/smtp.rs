//! SMTP transport over lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::DomainError;
use crate::ports::MailTransport;

pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailTransport {
    /// # Errors
    ///
    /// - `InvalidParam` on empty host/from/port or a bad relay address
    pub fn new(
        host: &str,
        port: u16,
        from: &str,
        password: &str,
    ) -> Result<Self, DomainError> {
        if host.is_empty() {
            return Err(DomainError::invalid_param("host is invalid"));
        }
        if from.is_empty() {
            return Err(DomainError::invalid_param("base mail is invalid"));
        }
        if port == 0 {
            return Err(DomainError::invalid_param("base port is invalid"));
        }
        if password.is_empty() {
            return Err(DomainError::invalid_param("pwd is invalid"));
        }

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| DomainError::invalid_param(format!("smtp relay failure: {e}")))?
            .port(port)
            .credentials(Credentials::new(from.to_string(), password.to_string()))
            .build();

        Ok(Self {
            mailer,
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DomainError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| DomainError::internal(format!("parse from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| DomainError::internal(format!("parse to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DomainError::internal(format!("build message failure: {e}")))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| DomainError::internal(format!("failed to send email: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_validates_connection_parameters() {
        assert!(SmtpMailTransport::new("", 587, "hub@example.com", "pwd").is_err());
        assert!(SmtpMailTransport::new("smtp.example.com", 0, "hub@example.com", "pwd").is_err());
        assert!(SmtpMailTransport::new("smtp.example.com", 587, "", "pwd").is_err());
        assert!(SmtpMailTransport::new("smtp.example.com", 587, "hub@example.com", "").is_err());
        assert!(SmtpMailTransport::new("smtp.example.com", 587, "hub@example.com", "pwd").is_ok());
    }
}
