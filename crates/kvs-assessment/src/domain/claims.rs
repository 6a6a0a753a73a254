//! Verified token claims, scoped to one request.

/// Claims returned by the Auth service for a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    pub issuer: String,
    pub subject: String,
    pub audience: Vec<String>,
    pub rights: Vec<String>,
}
