//! HTTP recipient lookup.
//!
//! Calls the auth service's private contacts endpoint
//! (`GET <base>/<user_id>`) and validates the payload into a [`Recipient`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::domain::{DomainError, Recipient};
use crate::ports::RecipientSource;

#[derive(Debug, Deserialize)]
struct RecipientDto {
    user_id: String,
    contacts: HashMap<String, String>,
}

pub struct HttpRecipientSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecipientSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DomainError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(DomainError::invalid_param("base url is empty"));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RecipientSource for HttpRecipientSource {
    async fn get_recipient_by_id(&self, user_id: &str) -> Result<Recipient, DomainError> {
        info!(user_id, "GetRecipientByID started");

        let url = format!("{}/{user_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("recipient request failure: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DomainError::not_found(format!(
                "recipient {user_id} not found"
            )));
        }
        if !response.status().is_success() {
            return Err(DomainError::internal(format!(
                "recipient request status: {}",
                response.status()
            )));
        }

        let dto: RecipientDto = response
            .json()
            .await
            .map_err(|e| DomainError::internal(format!("decode recipient failure: {e}")))?;

        let recipient = Recipient::new(dto.user_id, dto.contacts)?;

        info!(user_id, "GetRecipientByID completed");
        Ok(recipient)
    }
}
