//! Stream and consumer provisioning for JetStream.
//!
//! Streams and durable consumers are preconditions for the services, so
//! they are provisioned by an explicit migration run rather than created
//! ad hoc at service start.

use std::time::Duration;

use async_nats::jetstream::{self, consumer, stream};
use async_trait::async_trait;
use tracing::info;

use super::BrokerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationKind {
    Stream,
    Consumer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub id: String,
    pub name: String,
    pub applied: bool,
}

/// One provisioning step that can be applied, rolled back, and probed.
#[async_trait]
pub trait Migration: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn kind(&self) -> MigrationKind;

    async fn apply(&self, js: &jetstream::Context) -> Result<(), BrokerError>;
    async fn rollback(&self, js: &jetstream::Context) -> Result<(), BrokerError>;
    async fn is_applied(&self, js: &jetstream::Context) -> Result<bool, BrokerError>;
}

/// Creates or updates a file-backed stream with a retention window.
pub struct StreamMigration {
    id: String,
    name: String,
    stream_name: String,
    subjects: Vec<String>,
    max_age: Duration,
}

impl StreamMigration {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        stream_name: impl Into<String>,
        subjects: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stream_name: stream_name.into(),
            subjects,
            max_age: Duration::from_secs(24 * 60 * 60),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    fn config(&self) -> stream::Config {
        stream::Config {
            name: self.stream_name.clone(),
            subjects: self.subjects.clone(),
            max_age: self.max_age,
            storage: stream::StorageType::File,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Migration for StreamMigration {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> MigrationKind {
        MigrationKind::Stream
    }

    async fn apply(&self, js: &jetstream::Context) -> Result<(), BrokerError> {
        info!(stream = %self.stream_name, subjects = ?self.subjects, "provisioning stream");

        js.get_or_create_stream(self.config())
            .await
            .map_err(|e| {
                BrokerError::Internal(format!(
                    "failed to provision stream {}: {e}",
                    self.stream_name
                ))
            })?;

        info!(stream = %self.stream_name, "stream provisioned");
        Ok(())
    }

    async fn rollback(&self, js: &jetstream::Context) -> Result<(), BrokerError> {
        info!(stream = %self.stream_name, "deleting stream");

        match js.delete_stream(&self.stream_name).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("stream not found") => Ok(()),
            Err(e) => Err(BrokerError::Internal(format!(
                "failed to delete stream {}: {e}",
                self.stream_name
            ))),
        }
    }

    async fn is_applied(&self, js: &jetstream::Context) -> Result<bool, BrokerError> {
        Ok(js.get_stream(&self.stream_name).await.is_ok())
    }
}

/// Creates a durable pull consumer with explicit acknowledgement.
pub struct ConsumerMigration {
    id: String,
    name: String,
    stream_name: String,
    consumer_name: String,
    filter_subject: Option<String>,
}

impl ConsumerMigration {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        stream_name: impl Into<String>,
        consumer_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stream_name: stream_name.into(),
            consumer_name: consumer_name.into(),
            filter_subject: None,
        }
    }

    pub fn with_filter_subject(mut self, subject: impl Into<String>) -> Self {
        self.filter_subject = Some(subject.into());
        self
    }

    fn config(&self) -> consumer::pull::Config {
        consumer::pull::Config {
            durable_name: Some(self.consumer_name.clone()),
            ack_policy: consumer::AckPolicy::Explicit,
            deliver_policy: consumer::DeliverPolicy::All,
            filter_subject: self.filter_subject.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Migration for ConsumerMigration {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> MigrationKind {
        MigrationKind::Consumer
    }

    async fn apply(&self, js: &jetstream::Context) -> Result<(), BrokerError> {
        info!(
            stream = %self.stream_name,
            consumer = %self.consumer_name,
            "provisioning consumer"
        );

        let stream = js.get_stream(&self.stream_name).await.map_err(|e| {
            BrokerError::Internal(format!(
                "stream {} not available for consumer {}: {e}",
                self.stream_name, self.consumer_name
            ))
        })?;

        stream
            .get_or_create_consumer(&self.consumer_name, self.config())
            .await
            .map_err(|e| {
                BrokerError::Internal(format!(
                    "failed to provision consumer {}: {e}",
                    self.consumer_name
                ))
            })?;

        info!(consumer = %self.consumer_name, "consumer provisioned");
        Ok(())
    }

    async fn rollback(&self, js: &jetstream::Context) -> Result<(), BrokerError> {
        let stream = match js.get_stream(&self.stream_name).await {
            Ok(stream) => stream,
            Err(_) => return Ok(()),
        };

        match stream.delete_consumer(&self.consumer_name).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("consumer not found") => Ok(()),
            Err(e) => Err(BrokerError::Internal(format!(
                "failed to delete consumer {}: {e}",
                self.consumer_name
            ))),
        }
    }

    async fn is_applied(&self, js: &jetstream::Context) -> Result<bool, BrokerError> {
        let Ok(stream) = js.get_stream(&self.stream_name).await else {
            return Ok(false);
        };
        Ok(stream.consumer_info(&self.consumer_name).await.is_ok())
    }
}

/// Applies migrations in declared order, rolls back in reverse.
pub struct Migrator {
    migrations: Vec<Box<dyn Migration>>,
}

impl Migrator {
    pub fn new(migrations: Vec<Box<dyn Migration>>) -> Self {
        Self { migrations }
    }

    pub async fn up(&self, js: &jetstream::Context) -> Result<(), BrokerError> {
        for migration in &self.migrations {
            info!(id = migration.id(), name = migration.name(), "applying");
            migration.apply(js).await?;
        }
        Ok(())
    }

    pub async fn down(&self, js: &jetstream::Context) -> Result<(), BrokerError> {
        for migration in self.migrations.iter().rev() {
            info!(id = migration.id(), name = migration.name(), "rolling back");
            migration.rollback(js).await?;
        }
        Ok(())
    }

    pub async fn status(
        &self,
        js: &jetstream::Context,
    ) -> Result<Vec<MigrationStatus>, BrokerError> {
        let mut statuses = Vec::with_capacity(self.migrations.len());
        for migration in &self.migrations {
            statuses.push(MigrationStatus {
                id: migration.id().to_string(),
                name: migration.name().to_string(),
                applied: migration.is_applied(js).await?,
            });
        }
        Ok(statuses)
    }
}
