//! Publishes `SessionResultEvent` messages to the session stream.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kvs_toolkit::broker::{BrokerError, Publisher};
use serde::Serialize;
use tracing::error;

use crate::domain::{DomainError, SessionResult};
use crate::ports::SessionEventPublisher;

pub const SESSION_FINISHED_EVENT_TYPE: &str = "SessionResultEvent";

#[derive(Debug, Serialize)]
struct PayloadDto<'a> {
    user_id: &'a str,
    topics: &'a [String],
    questions: &'a HashMap<String, Vec<String>>,
    user_answers: &'a HashMap<String, Vec<String>>,
    is_expire: bool,
    is_success: bool,
    grade: &'a str,
}

#[derive(Debug, Serialize)]
struct EventDto<'a> {
    event_type: &'a str,
    payload: PayloadDto<'a>,
}

pub struct NatsSessionPublisher {
    publisher: Arc<Publisher>,
    subject: String,
}

impl NatsSessionPublisher {
    pub fn new(publisher: Arc<Publisher>, subject: impl Into<String>) -> Result<Self, DomainError> {
        let subject = subject.into();
        if subject.is_empty() {
            return Err(DomainError::internal("subject cannot be empty"));
        }

        Ok(Self { publisher, subject })
    }
}

#[async_trait]
impl SessionEventPublisher for NatsSessionPublisher {
    async fn session_finished(&self, result: &SessionResult) -> Result<(), DomainError> {
        let event = EventDto {
            event_type: SESSION_FINISHED_EVENT_TYPE,
            payload: PayloadDto {
                user_id: &result.user_id,
                topics: &result.topics,
                questions: &result.questions,
                user_answers: &result.user_answers,
                is_expire: result.is_expired,
                is_success: result.is_success,
                grade: &result.grade,
            },
        };

        let message = serde_json::to_vec(&event).map_err(|e| {
            let err = DomainError::internal(format!("failed to marshal payload: {e}"));
            error!("{err}");
            err
        })?;

        self.publisher
            .publish(&self.subject, message)
            .await
            .map_err(|e| {
                let err = match e {
                    BrokerError::InvalidParam(msg) => {
                        DomainError::invalid_param(format!("publish failure: {msg}"))
                    }
                    BrokerError::Internal(msg) => {
                        DomainError::internal(format!("publish failure: {msg}"))
                    }
                };
                error!("{err}");
                err
            })
    }
}
