//! Durable pull consumer over the session stream.
//!
//! A message is acknowledged only after the notifier chain reports
//! success; every failure path sends Nak so the broker redelivers.

use std::sync::Arc;

use async_nats::jetstream::{self, consumer, AckKind};
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::application::MessageService;
use crate::domain::{DomainError, SessionResult};

pub const SESSION_STREAM: &str = "session_stream";
pub const SESSION_CONSUMER: &str = "session-consumer";
pub const SESSION_SUBJECTS: &str = "sessions.*";

#[derive(Debug, Deserialize)]
struct PayloadDto {
    user_id: String,
    topics: Vec<String>,
    questions: std::collections::HashMap<String, Vec<String>>,
    user_answers: std::collections::HashMap<String, Vec<String>>,
    is_expire: bool,
    is_success: bool,
    grade: String,
}

#[derive(Debug, Deserialize)]
struct EventDto {
    #[allow(dead_code)]
    event_type: String,
    payload: PayloadDto,
}

fn event_to_result(event: EventDto) -> Result<SessionResult, DomainError> {
    let payload = event.payload;
    SessionResult::new(
        payload.user_id,
        payload.topics,
        payload.questions,
        payload.user_answers,
        payload.is_expire,
        payload.is_success,
        payload.grade,
    )
}

pub struct NatsConsumer {
    js: jetstream::Context,
    service: Arc<MessageService>,
}

impl NatsConsumer {
    pub fn new(client: async_nats::Client, service: Arc<MessageService>) -> Self {
        Self {
            js: jetstream::new(client),
            service,
        }
    }

    /// Consumes until the shutdown signal flips or the stream ends.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DomainError> {
        info!(
            stream = SESSION_STREAM,
            consumer = SESSION_CONSUMER,
            "starting consumer for session events"
        );

        let stream = self.js.get_stream(SESSION_STREAM).await.map_err(|e| {
            DomainError::internal(format!("failed to get stream {SESSION_STREAM}: {e}"))
        })?;

        let consumer = stream
            .get_or_create_consumer(
                SESSION_CONSUMER,
                consumer::pull::Config {
                    durable_name: Some(SESSION_CONSUMER.to_string()),
                    ack_policy: consumer::AckPolicy::Explicit,
                    filter_subject: SESSION_SUBJECTS.to_string(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| {
                DomainError::internal(format!("failed to bind consumer {SESSION_CONSUMER}: {e}"))
            })?;

        let mut messages = consumer.messages().await.map_err(|e| {
            DomainError::internal(format!("failed to subscribe to session stream: {e}"))
        })?;

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                next = messages.next() => {
                    match next {
                        Some(Ok(message)) => self.handle(message).await,
                        Some(Err(e)) => {
                            warn!(error = %e, "message pull failure");
                        }
                        None => break,
                    }
                }
            }
        }

        info!("consumer stopped");
        Ok(())
    }

    async fn handle(&self, message: jetstream::Message) {
        info!(subject = %message.subject, "received message");

        let event: EventDto = match serde_json::from_slice(&message.payload) {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, "failed to unmarshal session event");
                Self::nak(&message).await;
                return;
            }
        };

        let result = match event_to_result(event) {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "failed to create session result entity");
                Self::nak(&message).await;
                return;
            }
        };

        if let Err(e) = self.service.send_message(&result).await {
            error!(error = %e, user_id = result.user_id(), "failed to send notification");
            Self::nak(&message).await;
            return;
        }

        if let Err(e) = message.ack().await {
            error!(error = %e, "failed to ack message");
            return;
        }

        info!(user_id = result.user_id(), "successfully processed session event");
    }

    async fn nak(message: &jetstream::Message) {
        if let Err(e) = message.ack_with(AckKind::Nak(None)).await {
            error!(error = %e, "failed to nak message");
        }
    }
}
