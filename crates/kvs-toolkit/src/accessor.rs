//! Rights accessor shared by the HTTP ports.
//!
//! Handlers resolve verified [`Claims`] from the request (axum extensions)
//! and ask the accessor whether every required right is present. The
//! accessor itself holds no state.

use std::collections::HashSet;

use thiserror::Error;

/// Verified assertions about a principal, produced by token introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    pub issuer: String,
    pub subject: String,
    pub audience: Vec<String>,
    pub rights: Vec<String>,
}

/// Errors raised while evaluating permissions.
#[derive(Debug, Clone, Error)]
pub enum AccessorError {
    /// The request carried no resolvable claims.
    #[error("assertion error: {0}")]
    Assertion(String),
}

/// Evaluates "claims hold all required rights" for a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RightsAccessor;

impl RightsAccessor {
    pub fn new() -> Self {
        Self
    }

    /// Returns true iff `claims` carry every right in `required`.
    ///
    /// # Errors
    ///
    /// - `Assertion` if the request carried no claims at all
    pub fn has_permission(
        &self,
        claims: Option<&Claims>,
        required: &[String],
    ) -> Result<bool, AccessorError> {
        let claims = claims.ok_or_else(|| {
            AccessorError::Assertion("resolve claims from request context failure".into())
        })?;

        let held: HashSet<&str> = claims.rights.iter().map(String::as_str).collect();
        Ok(required.iter().all(|right| held.contains(right.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_rights(rights: &[&str]) -> Claims {
        Claims {
            username: "student".into(),
            issuer: "kvs-auth".into(),
            subject: "user-1".into(),
            audience: vec!["kvs".into()],
            rights: rights.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn permission_granted_when_all_rights_held() {
        let accessor = RightsAccessor::new();
        let claims = claims_with_rights(&["user", "admin"]);

        let granted = accessor
            .has_permission(Some(&claims), &["admin".into()])
            .unwrap();
        assert!(granted);
    }

    #[test]
    fn permission_denied_when_right_missing() {
        let accessor = RightsAccessor::new();
        let claims = claims_with_rights(&["user"]);

        let granted = accessor
            .has_permission(Some(&claims), &["admin".into()])
            .unwrap();
        assert!(!granted);
    }

    #[test]
    fn empty_requirement_always_granted() {
        let accessor = RightsAccessor::new();
        let claims = claims_with_rights(&[]);

        assert!(accessor.has_permission(Some(&claims), &[]).unwrap());
    }

    #[test]
    fn missing_claims_is_assertion_error() {
        let accessor = RightsAccessor::new();

        let err = accessor
            .has_permission(None, &["admin".into()])
            .unwrap_err();
        assert!(matches!(err, AccessorError::Assertion(_)));
    }
}
