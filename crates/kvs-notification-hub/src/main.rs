//! Notification hub entry point.

use std::process::ExitCode;
use std::sync::Arc;

use kvs_notification_hub::adapters::auth_api::HttpRecipientSource;
use kvs_notification_hub::adapters::mail::{MailNotifier, SmtpMailTransport};
use kvs_notification_hub::adapters::nats::NatsConsumer;
use kvs_notification_hub::application::MessageService;
use kvs_notification_hub::config::{HubConfig, LoggingConfig};
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("kvs-notification-hub init failure: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var("HUB_CONFIG_PATH")
        .map_err(|_| "HUB_CONFIG_PATH not set".to_string())?;
    let config = HubConfig::load(&config_path)?;
    config.validate()?;

    init_tracing(&config.logging);

    let transport = Arc::new(SmtpMailTransport::new(
        &config.smtp.host,
        config.smtp.port,
        &config.smtp.from,
        &config.smtp.password,
    )?);
    let notifier = Arc::new(MailNotifier::new(transport));

    let recipients = Arc::new(HttpRecipientSource::new(&config.auth_service.address)?);
    let service = Arc::new(MessageService::new(notifier, recipients));

    let client = async_nats::connect(&config.nats.url).await?;
    let consumer = NatsConsumer::new(client, service);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    info!("notification hub started");
    consumer.run(shutdown_rx).await?;

    info!("notification hub stopped gracefully");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(logging.level.clone()));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_file(logging.add_source)
            .with_line_number(logging.add_source)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_file(logging.add_source)
            .with_line_number(logging.add_source)
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("notification hub will be stopping");
}
