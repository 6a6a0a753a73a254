//! Notification recipient.

use std::collections::HashMap;

use super::DomainError;

/// A user to notify, with their contact channels (kind → address).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    id: String,
    contacts: HashMap<String, String>,
}

impl Recipient {
    /// # Errors
    ///
    /// - `InvalidParam` if the id is blank or no contacts are present
    pub fn new(
        id: impl Into<String>,
        contacts: HashMap<String, String>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_param("recipient id is empty"));
        }
        if contacts.is_empty() {
            return Err(DomainError::invalid_param("contacts is empty"));
        }

        Ok(Self {
            id: trimmed.to_string(),
            contacts,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn contacts(&self) -> &HashMap<String, String> {
        &self.contacts
    }
}
