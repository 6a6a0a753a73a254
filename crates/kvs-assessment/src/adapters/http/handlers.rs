//! HTTP handlers for the assessment endpoints.
//!
//! Every endpoint requires a bearer token; the handler introspects it
//! against the Auth service, gates on rights, then invokes the session
//! service.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use kvs_toolkit::accessor::{Claims as AccessorClaims, RightsAccessor};
use tracing::error;

use crate::application::SessionService;
use crate::domain::{Claims, DomainError};
use crate::ports::Introspector;

use super::dto::{
    CompletedSessionDto, CompletedSessionsListDto, ErrorDto, QuestionDto, SessionDto,
    SessionResultDto, TopicsDto, UserAnswersListDto,
};

/// Right required for session operations.
pub const USER_RIGHT: &str = "user";

const BEARER_PREFIX: &str = "Bearer ";

/// Application state for the assessment endpoints.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn SessionService>,
    pub introspector: Arc<dyn Introspector>,
    pub accessor: RightsAccessor,
}

impl AppState {
    pub fn new(service: Arc<dyn SessionService>, introspector: Arc<dyn Introspector>) -> Self {
        Self {
            service,
            introspector,
            accessor: RightsAccessor::new(),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, DomainError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| DomainError::forbidden("authorization header not set"))?
        .to_str()
        .map_err(|_| DomainError::forbidden("authorization header invalid"))?;

    let parts: Vec<&str> = header.split(BEARER_PREFIX).collect();
    if parts.len() != 2 {
        return Err(DomainError::forbidden("authorization header invalid"));
    }

    Ok(parts[1])
}

/// Introspects the bearer token and verifies the required rights.
///
/// With a `user_id` the Auth service also matches the token subject;
/// `None` requests token-only introspection for unscoped endpoints.
async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    user_id: Option<&str>,
    required_rights: &[String],
) -> Result<Claims, DomainError> {
    let token = bearer_token(headers)?;

    let claims = match user_id {
        Some(user_id) => state.introspector.introspect(user_id, token).await?,
        None => state.introspector.introspect_token(token).await?,
    };

    let accessor_claims = AccessorClaims {
        username: claims.username.clone(),
        issuer: claims.issuer.clone(),
        subject: claims.subject.clone(),
        audience: claims.audience.clone(),
        rights: claims.rights.clone(),
    };
    let granted = state
        .accessor
        .has_permission(Some(&accessor_claims), required_rights)
        .map_err(|e| DomainError::internal(e.to_string()))?;

    if !granted {
        return Err(DomainError::forbidden("user has not enough rights"));
    }

    Ok(claims)
}

fn err_response(err: DomainError) -> Response {
    error!("{err}");
    let (status, dto) = ErrorDto::from_domain_error(&err);
    (status, Json(dto)).into_response()
}

/// GET /kvs/v1/topics
pub async fn get_topics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(err) = authorize(&state, &headers, None, &[]).await {
        return err_response(err);
    }

    match state.service.show_topics().await {
        Ok(topics) => (StatusCode::OK, Json(TopicsDto { topics })).into_response(),
        Err(err) => err_response(err),
    }
}

/// POST /kvs/v1/:user_id/start_session
pub async fn start_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(topics_dto): Json<TopicsDto>,
) -> Response {
    if let Err(err) = authorize(
        &state,
        &headers,
        Some(&user_id),
        &[USER_RIGHT.to_string()],
    )
    .await
    {
        return err_response(err);
    }

    match state
        .service
        .create_session(&user_id, &topics_dto.topics)
        .await
    {
        Ok((session_id, questions)) => {
            let questions_dto: Vec<QuestionDto> =
                questions.values().map(QuestionDto::from).collect();

            let session_dto = SessionDto {
                session_id,
                topics: topics_dto.topics,
                questions: questions_dto,
            };
            (StatusCode::CREATED, Json(session_dto)).into_response()
        }
        Err(err) => err_response(err.context("CreateSession failure")),
    }
}

/// POST /kvs/v1/:user_id/:session_id/complete_session
pub async fn complete_session(
    State(state): State<AppState>,
    Path((user_id, session_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(answers_dto): Json<UserAnswersListDto>,
) -> Response {
    if let Err(err) = authorize(
        &state,
        &headers,
        Some(&user_id),
        &[USER_RIGHT.to_string()],
    )
    .await
    {
        return err_response(err);
    }

    let answers = match answers_dto.into_answers() {
        Ok(answers) => answers,
        Err(err) => {
            return err_response(DomainError::invalid_param(format!(
                "create user answer failure: {err}"
            )));
        }
    };

    match state.service.complete_session(&session_id, answers).await {
        Ok(result) => {
            (StatusCode::OK, Json(SessionResultDto::from(&result))).into_response()
        }
        Err(err) => err_response(err.context("CompleteSession failure")),
    }
}

/// GET /kvs/v1/:user_id/completed_sessions
pub async fn completed_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(err) = authorize(
        &state,
        &headers,
        Some(&user_id),
        &[USER_RIGHT.to_string()],
    )
    .await
    {
        return err_response(err);
    }

    let sessions = match state.service.get_all_completed_user_sessions(&user_id).await {
        Ok(sessions) => sessions,
        Err(err) => return err_response(err),
    };

    let mut completed = Vec::with_capacity(sessions.len());
    for session in &sessions {
        let dto = match completed_session_dto(session) {
            Ok(dto) => dto,
            Err(err) => return err_response(err),
        };
        completed.push(dto);
    }

    (
        StatusCode::OK,
        Json(CompletedSessionsListDto {
            completed_sessions: completed,
        }),
    )
        .into_response()
}

fn completed_session_dto(
    session: &crate::domain::Session,
) -> Result<CompletedSessionDto, DomainError> {
    let result = session.session_result()?;

    Ok(CompletedSessionDto {
        started_at: session.started_at()?,
        topics: session.topics().to_vec(),
        user_answers: UserAnswersListDto::from_answers(session.user_answers()?),
        is_expired: session.is_expired()?,
        session_result: SessionResultDto::from(&result),
    })
}
