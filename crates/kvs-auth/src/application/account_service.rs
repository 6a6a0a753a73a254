//! Account operations: sign-in, introspection, user administration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::domain::{DomainError, User, UserClaims};
use crate::ports::{IdGenerator, JwtProvider, PasswordHasher, UserStore};

/// Account operations exposed to the HTTP and gRPC ports.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Verifies credentials and issues a bearer token.
    async fn sign_in(&self, login: &str, password: &str) -> Result<String, DomainError>;

    /// Validates a token and checks its claims against the stored user.
    /// The token subject must match `user_id`; an empty `user_id` is
    /// rejected with `InvalidParam`.
    async fn introspect(&self, user_id: &str, token: &str) -> Result<UserClaims, DomainError>;

    /// Validates a token against the stored user without a subject match.
    /// Used where the caller has no target user, e.g. the admin gate.
    async fn introspect_token(&self, token: &str) -> Result<UserClaims, DomainError>;

    /// Creates a user; returns the generated user id.
    async fn add_user(
        &self,
        login: &str,
        password: &str,
        rights: Vec<String>,
        contacts: HashMap<String, String>,
    ) -> Result<String, DomainError>;

    async fn delete_user(&self, user_id: &str) -> Result<(), DomainError>;
}

pub struct AccountManager {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    jwt_provider: Arc<dyn JwtProvider>,
    generator: Arc<dyn IdGenerator>,
}

impl AccountManager {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        jwt_provider: Arc<dyn JwtProvider>,
        generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            store,
            hasher,
            jwt_provider,
            generator,
        }
    }

    /// Validates the token signature and checks its claimed rights against
    /// the stored user; subject verification is the caller's concern.
    async fn verify_token(&self, token: &str) -> Result<UserClaims, DomainError> {
        if token.is_empty() {
            return Err(DomainError::invalid_jwt("jwt is required"));
        }

        let claims = self
            .jwt_provider
            .introspect(token)
            .map_err(|e| e.context("Introspect"))?;

        let user = self
            .store
            .get_user_by_id(&claims.subject)
            .await
            .map_err(|e| e.context("GetUserByID"))?;

        for right in &claims.rights {
            if !user.rights.contains(right) {
                let err = DomainError::forbidden("not enough rights");
                error!("{err}");
                return Err(err);
            }
        }

        Ok(claims)
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn sign_in(&self, login: &str, password: &str) -> Result<String, DomainError> {
        info!("SignIn started");

        if login.is_empty() {
            return Err(DomainError::invalid_param("username is required"));
        }
        if password.is_empty() {
            return Err(DomainError::invalid_param("password is required"));
        }

        let user = self
            .store
            .get_user_by_username(login)
            .await
            .map_err(|e| e.context("GetUserByUsername"))?;

        let matches = self
            .hasher
            .verify(password, &user.password_hash)
            .map_err(|e| e.context("approvePassword"))?;
        if !matches {
            let err = DomainError::invalid_password("approvePassword failure");
            error!("{err}");
            return Err(err);
        }

        let token = self
            .jwt_provider
            .generate(&user)
            .map_err(|e| e.context("Generate JWT failure"))?;

        info!("SignIn completed");
        Ok(token)
    }

    async fn introspect(&self, user_id: &str, token: &str) -> Result<UserClaims, DomainError> {
        info!("Introspect started");

        if user_id.is_empty() {
            return Err(DomainError::invalid_param("user ID is required"));
        }

        let claims = self.verify_token(token).await?;

        if claims.subject != user_id {
            let err = DomainError::forbidden("user ID mismatch");
            error!("{err}");
            return Err(err);
        }

        info!("Introspect completed");
        Ok(claims)
    }

    async fn introspect_token(&self, token: &str) -> Result<UserClaims, DomainError> {
        info!("IntrospectToken started");

        let claims = self.verify_token(token).await?;

        info!("IntrospectToken completed");
        Ok(claims)
    }

    async fn add_user(
        &self,
        login: &str,
        password: &str,
        rights: Vec<String>,
        contacts: HashMap<String, String>,
    ) -> Result<String, DomainError> {
        info!("AddUser started");

        if login.is_empty() || password.is_empty() {
            return Err(DomainError::invalid_param("login or password is incorrect"));
        }

        match self.store.get_user_by_username(login).await {
            Ok(_) => {
                let err = DomainError::already_exists(format!(
                    "user name {login} already exists"
                ));
                error!("{err}");
                return Err(err);
            }
            Err(e) if e.is(crate::domain::ErrorKind::NotFound) => {}
            Err(e) => return Err(e.context("get user by name")),
        }

        let password_hash = self
            .hasher
            .hash(password)
            .map_err(|e| e.context("hash password"))?;

        let user = User {
            id: self.generator.generate_id(),
            username: login.to_string(),
            password_hash,
            rights,
            contacts,
            linked_id: String::new(),
        };

        self.store
            .store_user(&user)
            .await
            .map_err(|e| e.context("StoreUser"))?;

        info!(user_id = %user.id, "AddUser completed");
        Ok(user.id)
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), DomainError> {
        info!(user_id, "DeleteUser started");

        if user_id.is_empty() {
            return Err(DomainError::invalid_param("user id is required"));
        }

        self.store
            .remove_user(user_id)
            .await
            .map_err(|e| e.context("RemoveUser"))?;

        info!(user_id, "DeleteUser completed");
        Ok(())
    }
}
