//! User record and verified claims.

use std::collections::HashMap;

/// A user as stored by the auth service. Created by administrators;
/// consumed read-only everywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub rights: Vec<String>,
    /// Contact channel kind → address, e.g. `"email" → "user@example.com"`.
    pub contacts: HashMap<String, String>,
    pub linked_id: String,
}

/// Claims carried by an issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserClaims {
    pub username: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub subject: String,
    pub rights: Vec<String>,
}
