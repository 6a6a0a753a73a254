//! Ports: contracts the application layer depends on.

mod mail_transport;
mod notifier;
mod recipient_source;

pub use mail_transport::MailTransport;
pub use notifier::Notifier;
pub use recipient_source::RecipientSource;
