//! Route table for the auth HTTP port.

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{delete, post, put};
use axum::{Json, Router};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};

use super::dto::ErrorDto;
use super::handlers::{add_user, delete_user, signin, AppState};

/// Builds the `/auth/v1` router with the per-request timeout installed.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/auth/v1/signin", post(signin))
        .route("/auth/v1/add-user", put(add_user))
        .route("/auth/v1/delete-user/:user_id", delete(delete_user))
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
