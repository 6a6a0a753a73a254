//! Thin wrapper over the generated `auth.v1.AuthService` client.

use thiserror::Error;
use tonic::transport::{Channel, Endpoint};

use crate::authpb::auth_service_client::AuthServiceClient;
use crate::authpb::{IntrospectRequest, IntrospectResponse};

#[derive(Debug, Error)]
pub enum AuthClientError {
    #[error("invalid auth service address: {0}")]
    InvalidAddress(String),

    #[error("auth service transport failure: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("auth service call failure: {0}")]
    Call(#[from] tonic::Status),
}

/// gRPC client for the Auth service private endpoint.
///
/// One channel per service instance; the channel reconnects lazily, so
/// construction does not require the Auth service to be up.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: AuthServiceClient<Channel>,
}

impl AuthClient {
    pub fn new(addr: &str) -> Result<Self, AuthClientError> {
        if addr.trim().is_empty() {
            return Err(AuthClientError::InvalidAddress("address is empty".into()));
        }

        let endpoint = Endpoint::from_shared(addr.to_string())
            .map_err(|e| AuthClientError::InvalidAddress(e.to_string()))?;
        let channel = endpoint.connect_lazy();

        Ok(Self {
            client: AuthServiceClient::new(channel),
        })
    }

    /// Validates a bearer token for a user, returning the raw response.
    ///
    /// The Auth service reports domain failures in-band via `error_message`;
    /// a transport-level failure surfaces as `Call`.
    pub async fn introspect(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<IntrospectResponse, AuthClientError> {
        let request = IntrospectRequest {
            token: token.to_string(),
            user_id: user_id.to_string(),
        };

        let mut client = self.client.clone();
        let response = client.introspect(request).await?;
        Ok(response.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_address_is_rejected() {
        let err = AuthClient::new("  ").unwrap_err();
        assert!(matches!(err, AuthClientError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn lazy_connect_does_not_require_live_server() {
        let client = AuthClient::new("http://127.0.0.1:1");
        assert!(client.is_ok());
    }
}
