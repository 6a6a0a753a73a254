//! Assessment service entry point.

use std::process::ExitCode;
use std::sync::Arc;

use kvs_assessment::adapters::auth::AuthServiceIntrospector;
use kvs_assessment::adapters::generator::CryptoIdGenerator;
use kvs_assessment::adapters::http::{router, AppState};
use kvs_assessment::adapters::nats::NatsSessionPublisher;
use kvs_assessment::adapters::postgres::{PostgresQuestionStore, PostgresSessionStore};
use kvs_assessment::application::{PublishingSessionService, SessionManager};
use kvs_assessment::config::{AssessmentConfig, LoggingConfig};
use kvs_toolkit::auth_client::AuthClient;
use kvs_toolkit::broker::Publisher;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing::{info, warn};

/// How long in-flight handlers get to finish after the shutdown signal.
const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("kvs-assessment init failure: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var("KVS_CONFIG_PATH")
        .map_err(|_| "KVS_CONFIG_PATH not set".to_string())?;
    let config = AssessmentConfig::load(&config_path)?;
    config.validate()?;

    init_tracing(&config.logging);

    let pool = PgPoolOptions::new()
        .connect(&config.storage.connection)
        .await?;

    let publisher = Arc::new(Publisher::connect(&config.nats.url).await?);
    let event_publisher = Arc::new(NatsSessionPublisher::new(
        publisher,
        &config.nats.subject,
    )?);

    let auth_client = AuthClient::new(&config.auth_service.address)?;
    let introspector = Arc::new(AuthServiceIntrospector::new(auth_client));

    let question_store = Arc::new(PostgresQuestionStore::new(pool.clone()));
    let session_store = Arc::new(PostgresSessionStore::new(
        pool.clone(),
        question_store.clone(),
    ));

    let manager = Arc::new(SessionManager::new(
        question_store,
        session_store.clone(),
        session_store,
        Arc::new(CryptoIdGenerator::new()),
    ));
    let service = Arc::new(
        PublishingSessionService::new(manager, event_publisher)
            .with_publish_timeout(config.nats.publish_timeout()),
    );

    let state = AppState::new(service, introspector);
    let app = router(state, config.http.public.request_timeout());

    let listener =
        tokio::net::TcpListener::bind(("0.0.0.0", config.http.public.port)).await?;
    info!(port = config.http.public.port, "assessment service started");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut serve_rx = shutdown_rx.clone();
    let mut drain_rx = shutdown_rx;
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = serve_rx.changed().await;
    });

    tokio::select! {
        outcome = server => outcome?,
        _ = async {
            let _ = drain_rx.changed().await;
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        } => {
            warn!("drain window elapsed, abandoning in-flight handlers");
        }
    }

    pool.close().await;
    info!("server stop gracefully");
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

    info!("server will be stopping");
}
