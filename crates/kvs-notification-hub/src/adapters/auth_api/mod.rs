//! Recipient lookup against the auth service.

mod recipient_source;

pub use recipient_source::HttpRecipientSource;
