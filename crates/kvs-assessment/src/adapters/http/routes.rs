//! Route table for the public HTTP port.

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};

use super::dto::ErrorDto;
use super::handlers::{
    complete_session, completed_sessions, get_topics, start_session, AppState,
};

/// Builds the `/kvs/v1` router with the per-request timeout installed.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/kvs/v1/topics", get(get_topics))
        .route("/kvs/v1/:user_id/start_session", post(start_session))
        .route(
            "/kvs/v1/:user_id/:session_id/complete_session",
            post(complete_session),
        )
        .route(
            "/kvs/v1/:user_id/completed_sessions",
            get(completed_sessions),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<ErrorDto>) {
    let status = if err.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorDto {
            status_code: status.as_u16(),
            error_message: err.to_string(),
        }),
    )
}
