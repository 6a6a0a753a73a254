//! Password hashing port.

use crate::domain::DomainError;

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Returns true iff the password matches the stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}
