//! Auth service entry point: public HTTP port plus the private gRPC
//! introspection port.

use std::process::ExitCode;
use std::sync::Arc;

use kvs_auth::adapters::generator::UuidIdGenerator;
use kvs_auth::adapters::grpc::GrpcAuthService;
use kvs_auth::adapters::hasher::BcryptHasher;
use kvs_auth::adapters::http::{router, AppState};
use kvs_auth::adapters::jwt::HsJwtProvider;
use kvs_auth::adapters::postgres::PostgresUserStore;
use kvs_auth::application::{AccountManager, AccountService};
use kvs_auth::config::{AuthConfig, LoggingConfig};
use kvs_toolkit::authpb::auth_service_server::AuthServiceServer;
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
            eprintln!("kvs-auth init failure: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var("AUTH_CONFIG_PATH")
        .map_err(|_| "AUTH_CONFIG_PATH not set".to_string())?;
    let config = AuthConfig::load(&config_path)?;
    config.validate()?;

    init_tracing(&config.logging);

    let pool = PgPoolOptions::new()
        .connect(&config.storage.connection)
        .await?;

    let ttl = config
        .jwt
        .token_ttl()
        .ok_or_else(|| "jwt.ttl is invalid".to_string())?;
    let jwt_provider = Arc::new(HsJwtProvider::new(
        config.jwt.secret.as_bytes(),
        config.jwt.aud.clone(),
        config.jwt.iss.clone(),
        chrono::Duration::from_std(ttl)?,
    )?);

    let service: Arc<dyn AccountService> = Arc::new(AccountManager::new(
        Arc::new(PostgresUserStore::new(pool.clone())),
        Arc::new(BcryptHasher::new()),
        jwt_provider,
        Arc::new(UuidIdGenerator::new()),
    ));

    let grpc_addr = format!("0.0.0.0:{}", config.grpc.private.port).parse()?;
    let grpc_service = GrpcAuthService::new(service.clone());
    let grpc_server = tonic::transport::Server::builder()
        .add_service(AuthServiceServer::new(grpc_service))
        .serve(grpc_addr);
    let grpc_task = tokio::spawn(grpc_server);
    info!(port = config.grpc.private.port, "gRPC server started");

    let state = AppState::new(service);
    let app = router(state, config.http.public.request_timeout());
    let listener =
        tokio::net::TcpListener::bind(("0.0.0.0", config.http.public.port)).await?;
    info!(port = config.http.public.port, "auth service started");

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

    grpc_task.abort();
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
