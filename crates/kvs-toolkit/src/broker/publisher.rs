//! JetStream publisher.

use async_nats::jetstream;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("invalid param: {0}")]
    InvalidParam(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Publishes messages into a JetStream-backed stream.
///
/// One connection per publishing service; messages are acknowledged by the
/// broker before `publish` returns, so a successful call means the event
/// reached the stream.
pub struct Publisher {
    js: jetstream::Context,
}

impl Publisher {
    pub async fn connect(nats_url: &str) -> Result<Self, BrokerError> {
        if nats_url.trim().is_empty() {
            return Err(BrokerError::InvalidParam("nats url is empty".into()));
        }

        let client = async_nats::connect(nats_url)
            .await
            .map_err(|e| BrokerError::Internal(format!("connection err: {e}")))?;

        Ok(Self {
            js: jetstream::new(client),
        })
    }

    pub async fn publish(&self, subject: &str, message: Vec<u8>) -> Result<(), BrokerError> {
        if subject.trim().is_empty() {
            return Err(BrokerError::InvalidParam("subject is empty".into()));
        }

        info!(subject, "publishing event into stream");

        let ack = self
            .js
            .publish(subject.to_string(), message.into())
            .await
            .map_err(|e| BrokerError::Internal(format!("failed to publish message: {e}")))?;

        ack.await
            .map_err(|e| BrokerError::Internal(format!("broker did not ack message: {e}")))?;

        Ok(())
    }
}
