//! User persistence port.

use async_trait::async_trait;

use crate::domain::{DomainError, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    ///
    /// - `NotFound` if no row matches
    async fn get_user_by_id(&self, user_id: &str) -> Result<User, DomainError>;

    /// # Errors
    ///
    /// - `NotFound` if no row matches
    async fn get_user_by_username(&self, username: &str) -> Result<User, DomainError>;

    /// Inserts a new user; uniqueness of (uid, name) is verified inside one
    /// transaction.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` on a uid or name conflict
    async fn store_user(&self, user: &User) -> Result<(), DomainError>;

    /// Partial update: only non-empty fields overwrite stored values.
    async fn update_user(&self, user: &User) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `NotFound` if no row was deleted
    async fn remove_user(&self, user_id: &str) -> Result<(), DomainError>;
}
