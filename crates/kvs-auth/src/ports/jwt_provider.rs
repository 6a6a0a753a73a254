//! Token issuance and validation port.

use crate::domain::{DomainError, User, UserClaims};

/// Issues signed bearer tokens and validates them back into claims.
pub trait JwtProvider: Send + Sync {
    /// # Errors
    ///
    /// - `InvalidJwt` if signing fails
    fn generate(&self, user: &User) -> Result<String, DomainError>;

    /// # Errors
    ///
    /// - `InvalidJwt` if the token is absent, malformed, expired, or signed
    ///   with the wrong key
    fn introspect(&self, token: &str) -> Result<UserClaims, DomainError>;
}
