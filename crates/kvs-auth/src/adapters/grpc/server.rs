//! Introspection over gRPC.
//!
//! Domain failures travel in-band via `error_message`; the transport status
//! stays OK so callers can distinguish "rejected token" from "auth service
//! down".

use std::sync::Arc;

use kvs_toolkit::authpb::auth_service_server::AuthService as AuthServiceGrpc;
use kvs_toolkit::authpb::{IntrospectRequest, IntrospectResponse, UserClaims as UserClaimsPb};
use tonic::{Request, Response, Status};
use tracing::{error, info};

use crate::application::AccountService;

pub struct GrpcAuthService {
    service: Arc<dyn AccountService>,
}

impl GrpcAuthService {
    pub fn new(service: Arc<dyn AccountService>) -> Self {
        Self { service }
    }

    fn reject(message: String) -> IntrospectResponse {
        IntrospectResponse {
            claims: None,
            error_message: message,
        }
    }
}

#[tonic::async_trait]
impl AuthServiceGrpc for GrpcAuthService {
    async fn introspect(
        &self,
        request: Request<IntrospectRequest>,
    ) -> Result<Response<IntrospectResponse>, Status> {
        info!("Introspect started");

        let request = request.into_inner();

        if request.token.is_empty() {
            let response = Self::reject("jwt token is empty".to_string());
            error!("Introspect rejected: empty token");
            return Ok(Response::new(response));
        }

        // proto3 encodes an absent user_id as the empty string; that maps
        // to token-only introspection, everything else to a subject match.
        let outcome = if request.user_id.is_empty() {
            self.service.introspect_token(&request.token).await
        } else {
            self.service
                .introspect(&request.user_id, &request.token)
                .await
        };

        match outcome {
            Ok(claims) => {
                info!("Introspect completed");
                Ok(Response::new(IntrospectResponse {
                    claims: Some(UserClaimsPb {
                        username: claims.username,
                        issuer: claims.issuer,
                        audience: claims.audience,
                        subject: claims.subject,
                        rights: claims.rights,
                    }),
                    error_message: String::new(),
                }))
            }
            Err(e) => {
                error!("Introspect failure: {e}");
                Ok(Response::new(Self::reject(e.to_string())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, UserClaims};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StubAccountService {
        outcome: Result<UserClaims, DomainError>,
    }

    #[async_trait]
    impl AccountService for StubAccountService {
        async fn sign_in(&self, _login: &str, _password: &str) -> Result<String, DomainError> {
            unimplemented!("not used by the gRPC port")
        }

        async fn introspect(
            &self,
            user_id: &str,
            _token: &str,
        ) -> Result<UserClaims, DomainError> {
            if user_id.is_empty() {
                return Err(DomainError::invalid_param("user ID is required"));
            }
            self.outcome.clone()
        }

        async fn introspect_token(&self, _token: &str) -> Result<UserClaims, DomainError> {
            self.outcome.clone()
        }

        async fn add_user(
            &self,
            _login: &str,
            _password: &str,
            _rights: Vec<String>,
            _contacts: HashMap<String, String>,
        ) -> Result<String, DomainError> {
            unimplemented!("not used by the gRPC port")
        }

        async fn delete_user(&self, _user_id: &str) -> Result<(), DomainError> {
            unimplemented!("not used by the gRPC port")
        }
    }

    fn claims() -> UserClaims {
        UserClaims {
            username: "student".to_string(),
            issuer: "kvs-auth".to_string(),
            audience: vec!["kvs".to_string()],
            subject: "user-1".to_string(),
            rights: vec!["user".to_string()],
        }
    }

    #[tokio::test]
    async fn valid_token_yields_claims_and_empty_error() {
        let service = GrpcAuthService::new(Arc::new(StubAccountService {
            outcome: Ok(claims()),
        }));

        let response = service
            .introspect(Request::new(IntrospectRequest {
                token: "token".to_string(),
                user_id: "user-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.error_message.is_empty());
        let claims = response.claims.unwrap();
        assert_eq!(claims.subject, "user-1");
        assert_eq!(claims.rights, vec!["user".to_string()]);
    }

    #[tokio::test]
    async fn empty_token_is_rejected_in_band() {
        let service = GrpcAuthService::new(Arc::new(StubAccountService {
            outcome: Ok(claims()),
        }));

        let response = service
            .introspect(Request::new(IntrospectRequest {
                token: String::new(),
                user_id: "user-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.claims.is_none());
        assert_eq!(response.error_message, "jwt token is empty");
    }

    #[tokio::test]
    async fn absent_user_id_routes_to_token_only_introspection() {
        let service = GrpcAuthService::new(Arc::new(StubAccountService {
            outcome: Ok(claims()),
        }));

        let response = service
            .introspect(Request::new(IntrospectRequest {
                token: "token".to_string(),
                user_id: String::new(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.error_message.is_empty());
        assert_eq!(response.claims.unwrap().subject, "user-1");
    }

    #[tokio::test]
    async fn domain_failure_travels_in_error_message() {
        let service = GrpcAuthService::new(Arc::new(StubAccountService {
            outcome: Err(DomainError::forbidden("not enough rights")),
        }));

        let response = service
            .introspect(Request::new(IntrospectRequest {
                token: "token".to_string(),
                user_id: "user-1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.claims.is_none());
        assert!(response.error_message.contains("not enough rights"));
    }
}
