//! JetStream plumbing shared by publishers and the provisioning tool.

mod migrations;
mod publisher;

pub use migrations::{
    ConsumerMigration, Migration, MigrationKind, MigrationStatus, Migrator, StreamMigration,
};
pub use publisher::{BrokerError, Publisher};
