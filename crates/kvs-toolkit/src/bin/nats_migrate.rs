//! JetStream provisioning tool.
//!
//! Reads `NATS_URL` and `MIGRATION_MODE` (`up|down|status`) and provisions
//! the session stream and its durable consumer.

use std::process::ExitCode;
use std::time::Duration;

use kvs_toolkit::broker::{ConsumerMigration, Migrator, StreamMigration};
use tracing::{error, info};

const SESSION_STREAM: &str = "session_stream";
const SESSION_CONSUMER: &str = "session-consumer";
const SESSION_SUBJECTS: &str = "sessions.*";
const RETENTION_DAYS: u64 = 7;

fn migrator() -> Migrator {
    Migrator::new(vec![
        Box::new(
            StreamMigration::new(
                "001",
                "create session stream",
                SESSION_STREAM,
                vec![SESSION_SUBJECTS.to_string()],
            )
            .with_max_age(Duration::from_secs(RETENTION_DAYS * 24 * 60 * 60)),
        ),
        Box::new(
            ConsumerMigration::new(
                "002",
                "create session consumer",
                SESSION_STREAM,
                SESSION_CONSUMER,
            )
            .with_filter_subject(SESSION_SUBJECTS),
        ),
    ])
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().init();

    let Ok(nats_url) = std::env::var("NATS_URL") else {
        error!("NATS_URL not set");
        return ExitCode::FAILURE;
    };

    let mode = std::env::var("MIGRATION_MODE").unwrap_or_else(|_| "up".to_string());

    let client = match async_nats::connect(&nats_url).await {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "nats connection failure");
            return ExitCode::FAILURE;
        }
    };
    let js = async_nats::jetstream::new(client);

    let migrator = migrator();
    let outcome = match mode.as_str() {
        "up" => migrator.up(&js).await,
        "down" => migrator.down(&js).await,
        "status" => match migrator.status(&js).await {
            Ok(statuses) => {
                for status in statuses {
                    info!(
                        id = %status.id,
                        name = %status.name,
                        applied = status.applied,
                        "migration status"
                    );
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
        other => {
            error!(mode = other, "unknown MIGRATION_MODE, expected up|down|status");
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "migration run failure");
            ExitCode::FAILURE
        }
    }
}
