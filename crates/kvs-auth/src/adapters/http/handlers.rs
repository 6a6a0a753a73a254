//! HTTP handlers for the auth endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use kvs_toolkit::accessor::{Claims as AccessorClaims, RightsAccessor};
use tracing::error;

use crate::application::AccountService;
use crate::domain::{DomainError, UserClaims};

use super::dto::{AddUserDto, AddUserResponseDto, ErrorDto, SigninRequestDto, SigninResponseDto};

/// Right required for user administration.
pub const ADMIN_RIGHT: &str = "admin";

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn AccountService>,
    pub accessor: RightsAccessor,
}

impl AppState {
    pub fn new(service: Arc<dyn AccountService>) -> Self {
        Self {
            service,
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

/// Introspects the caller's token and requires the admin right.
///
/// Token-only introspection: there is no target user to match the subject
/// against, so only signature, stored rights, and the admin right gate.
async fn authorize_admin(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<UserClaims, DomainError> {
    let token = bearer_token(headers)?;

    let claims = state.service.introspect_token(token).await?;

    let accessor_claims = AccessorClaims {
        username: claims.username.clone(),
        issuer: claims.issuer.clone(),
        subject: claims.subject.clone(),
        audience: claims.audience.clone(),
        rights: claims.rights.clone(),
    };
    let granted = state
        .accessor
        .has_permission(Some(&accessor_claims), &[ADMIN_RIGHT.to_string()])
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

/// POST /auth/v1/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SigninRequestDto>,
) -> Response {
    match state.service.sign_in(&request.login, &request.password).await {
        Ok(token) => (StatusCode::CREATED, Json(SigninResponseDto { token })).into_response(),
        Err(err) => err_response(err.context("signin command executing failure")),
    }
}

/// PUT /auth/v1/add-user (admin only)
pub async fn add_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddUserDto>,
) -> Response {
    if let Err(err) = authorize_admin(&state, &headers).await {
        return err_response(err);
    }

    match state
        .service
        .add_user(
            &request.name,
            &request.password,
            request.rights,
            request.contacts,
        )
        .await
    {
        Ok(user_id) => {
            (StatusCode::CREATED, Json(AddUserResponseDto { user_id })).into_response()
        }
        Err(err) => err_response(err.context("add user command executing failure")),
    }
}

/// DELETE /auth/v1/delete-user/:user_id (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(err) = authorize_admin(&state, &headers).await {
        return err_response(err);
    }

    match state.service.delete_user(&user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err_response(err.context("delete user command executing failure")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::hasher::BcryptHasher;
    use crate::adapters::jwt::HsJwtProvider;
    use crate::application::AccountManager;
    use crate::domain::{ErrorKind, User};
    use crate::ports::{IdGenerator, JwtProvider, PasswordHasher, UserStore};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Duration;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt;

    // ───────────────────────────────────────────────────────────────
    // Mock implementations
    // ───────────────────────────────────────────────────────────────

    struct MockAccountService {
        token: Option<String>,
        claims: Option<UserClaims>,
        added_user_id: Option<String>,
        delete_outcome: Option<Result<(), DomainError>>,
    }

    impl Default for MockAccountService {
        fn default() -> Self {
            Self {
                token: None,
                claims: None,
                added_user_id: None,
                delete_outcome: None,
            }
        }
    }

    #[async_trait]
    impl AccountService for MockAccountService {
        async fn sign_in(&self, _login: &str, _password: &str) -> Result<String, DomainError> {
            self.token
                .clone()
                .ok_or_else(|| DomainError::invalid_password("approvePassword failure"))
        }

        async fn introspect(
            &self,
            _user_id: &str,
            _token: &str,
        ) -> Result<UserClaims, DomainError> {
            self.claims
                .clone()
                .ok_or_else(|| DomainError::invalid_jwt("jwt parse failure"))
        }

        async fn introspect_token(&self, _token: &str) -> Result<UserClaims, DomainError> {
            self.claims
                .clone()
                .ok_or_else(|| DomainError::invalid_jwt("jwt parse failure"))
        }

        async fn add_user(
            &self,
            _login: &str,
            _password: &str,
            _rights: Vec<String>,
            _contacts: HashMap<String, String>,
        ) -> Result<String, DomainError> {
            self.added_user_id
                .clone()
                .ok_or_else(|| DomainError::already_exists("user name already exists"))
        }

        async fn delete_user(&self, _user_id: &str) -> Result<(), DomainError> {
            self.delete_outcome
                .clone()
                .expect("delete outcome not configured")
        }
    }

    fn admin_claims() -> UserClaims {
        UserClaims {
            username: "admin".to_string(),
            issuer: "kvs-auth".to_string(),
            audience: vec!["kvs".to_string()],
            subject: "user-1".to_string(),
            rights: vec!["admin".to_string()],
        }
    }

    fn app(service: MockAccountService) -> axum::Router {
        let state = AppState::new(Arc::new(service));
        super::super::router(state, std::time::Duration::from_secs(30))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    // ───────────────────────────────────────────────────────────────
    // Sign-in
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn signin_returns_created_with_token() {
        let app = app(MockAccountService {
            token: Some("jwt-token".to_string()),
            ..Default::default()
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/v1/signin")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"login":"admin","password":"password123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["token"], "jwt-token");
    }

    #[tokio::test]
    async fn signin_with_wrong_password_is_forbidden() {
        let app = app(MockAccountService::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/v1/signin")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"login":"admin","password":"wrong"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert!(body["error_message"]
            .as_str()
            .unwrap()
            .contains("invalid password"));
    }

    // ───────────────────────────────────────────────────────────────
    // Admin gating
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn add_user_without_header_is_forbidden() {
        let app = app(MockAccountService {
            claims: Some(admin_claims()),
            added_user_id: Some("user-2".to_string()),
            ..Default::default()
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/auth/v1/add-user")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"student","password":"secret"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn add_user_without_admin_right_is_forbidden() {
        let mut claims = admin_claims();
        claims.rights = vec!["user".to_string()];
        let app = app(MockAccountService {
            claims: Some(claims),
            added_user_id: Some("user-2".to_string()),
            ..Default::default()
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/auth/v1/add-user")
                    .header(header::AUTHORIZATION, "Bearer token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"student","password":"secret"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert!(body["error_message"]
            .as_str()
            .unwrap()
            .contains("user has not enough rights"));
    }

    #[tokio::test]
    async fn add_user_as_admin_returns_new_user_id() {
        let app = app(MockAccountService {
            claims: Some(admin_claims()),
            added_user_id: Some("user-2".to_string()),
            ..Default::default()
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/auth/v1/add-user")
                    .header(header::AUTHORIZATION, "Bearer token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"name":"student","password":"secret","rights":["user"],"contacts":{"email":"s@example.com"}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["user_id"], "user-2");
    }

    #[tokio::test]
    async fn add_user_conflict_is_conflict_status() {
        let app = app(MockAccountService {
            claims: Some(admin_claims()),
            added_user_id: None,
            ..Default::default()
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/auth/v1/add-user")
                    .header(header::AUTHORIZATION, "Bearer token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"admin","password":"secret"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn delete_user_returns_no_content() {
        let app = app(MockAccountService {
            claims: Some(admin_claims()),
            delete_outcome: Some(Ok(())),
            ..Default::default()
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/auth/v1/delete-user/user-2")
                    .header(header::AUTHORIZATION, "Bearer token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let app = app(MockAccountService {
            claims: Some(admin_claims()),
            delete_outcome: Some(Err(DomainError::not_found(
                "not found user with id='ghost'",
            ))),
            ..Default::default()
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/auth/v1/delete-user/ghost")
                    .header(header::AUTHORIZATION, "Bearer token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // ───────────────────────────────────────────────────────────────
    // Full-stack sign-in (bcrypt + HS256)
    // ───────────────────────────────────────────────────────────────

    struct SingleUserStore {
        user: Mutex<Option<User>>,
    }

    #[async_trait]
    impl UserStore for SingleUserStore {
        async fn get_user_by_id(&self, user_id: &str) -> Result<User, DomainError> {
            self.user
                .lock()
                .unwrap()
                .clone()
                .filter(|u| u.id == user_id)
                .ok_or_else(|| DomainError::not_found("user not found"))
        }

        async fn get_user_by_username(&self, username: &str) -> Result<User, DomainError> {
            self.user
                .lock()
                .unwrap()
                .clone()
                .filter(|u| u.username == username)
                .ok_or_else(|| DomainError::not_found("user not found"))
        }

        async fn store_user(&self, user: &User) -> Result<(), DomainError> {
            *self.user.lock().unwrap() = Some(user.clone());
            Ok(())
        }

        async fn update_user(&self, _user: &User) -> Result<(), DomainError> {
            Ok(())
        }

        async fn remove_user(&self, _user_id: &str) -> Result<(), DomainError> {
            *self.user.lock().unwrap() = None;
            Ok(())
        }
    }

    struct UuidLikeGenerator;

    impl IdGenerator for UuidLikeGenerator {
        fn generate_id(&self) -> String {
            "user-1".to_string()
        }
    }

    #[tokio::test]
    async fn signin_issues_token_parseable_by_the_same_issuer() {
        let hasher = BcryptHasher::with_cost(4);
        let password_hash = hasher.hash("password123").unwrap();

        let store = SingleUserStore {
            user: Mutex::new(Some(User {
                id: "user-1".to_string(),
                username: "admin".to_string(),
                password_hash,
                rights: vec!["admin".to_string()],
                contacts: HashMap::new(),
                linked_id: String::new(),
            })),
        };

        let provider = Arc::new(
            HsJwtProvider::new(
                b"test-secret",
                vec!["kvs".to_string()],
                "kvs-auth",
                Duration::hours(1),
            )
            .unwrap(),
        );

        let service = AccountManager::new(
            Arc::new(store),
            Arc::new(hasher),
            provider.clone(),
            Arc::new(UuidLikeGenerator),
        );
        let state = AppState::new(Arc::new(service));
        let app = super::super::router(state, std::time::Duration::from_secs(30));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/v1/signin")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"login":"admin","password":"password123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap();

        let claims = provider.introspect(token).unwrap();
        assert_eq!(claims.subject, "user-1");
        assert_eq!(claims.username, "admin");

        // Wrong password path on the same stack.
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/v1/signin")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"login":"admin","password":"wrong"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        let (status, _) =
            ErrorDto::from_domain_error(&DomainError::new(ErrorKind::InvalidPassword, "x"));
        assert_eq!(body["status_code"], status.as_u16());
    }
}
