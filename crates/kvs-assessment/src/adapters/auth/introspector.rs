//! Bearer-token introspection via the Auth service.

use async_trait::async_trait;
use kvs_toolkit::auth_client::AuthClient;
use tracing::{error, info};

use crate::domain::{Claims, DomainError};
use crate::ports::Introspector;

pub struct AuthServiceIntrospector {
    client: AuthClient,
}

impl AuthServiceIntrospector {
    pub fn new(client: AuthClient) -> Self {
        Self { client }
    }

    async fn call(&self, user_id: &str, token: &str) -> Result<Claims, DomainError> {
        let response = self.client.introspect(user_id, token).await.map_err(|e| {
            let err = DomainError::internal(format!("introspect failure: {e}"));
            error!("{err}");
            err
        })?;

        if !response.error_message.is_empty() {
            let err =
                DomainError::forbidden(format!("error message: {}", response.error_message));
            error!("{err}");
            return Err(err);
        }

        let claims = response.claims.ok_or_else(|| {
            let err = DomainError::forbidden("nil claims");
            error!("{err}");
            err
        })?;

        Ok(Claims {
            username: claims.username,
            issuer: claims.issuer,
            subject: claims.subject,
            audience: claims.audience,
            rights: claims.rights,
        })
    }
}

#[async_trait]
impl Introspector for AuthServiceIntrospector {
    async fn introspect(&self, user_id: &str, token: &str) -> Result<Claims, DomainError> {
        info!("Introspect started");
        let claims = self.call(user_id, token).await?;
        info!("Introspect completed");
        Ok(claims)
    }

    async fn introspect_token(&self, token: &str) -> Result<Claims, DomainError> {
        info!("IntrospectToken started");
        // An empty user_id is the wire encoding of "no subject check".
        let claims = self.call("", token).await?;
        info!("IntrospectToken completed");
        Ok(claims)
    }
}
