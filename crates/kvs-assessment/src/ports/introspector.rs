//! Bearer-token introspection port.

use async_trait::async_trait;

use crate::domain::{Claims, DomainError};

/// Validates a bearer token against the Auth service and returns the
/// verified claims.
#[async_trait]
pub trait Introspector: Send + Sync {
    /// Subject-checked introspection: the token must belong to `user_id`.
    async fn introspect(&self, user_id: &str, token: &str) -> Result<Claims, DomainError>;

    /// Token-only introspection, for endpoints without a user in the path.
    /// Signature and rights are still verified by the Auth service.
    async fn introspect_token(&self, token: &str) -> Result<Claims, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn introspector_is_object_safe() {
        fn _accepts_dyn(_introspector: &dyn Introspector) {}
    }
}
