//! HS256 JWT provider.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::{DomainError, User, UserClaims};
use crate::ports::JwtProvider;

/// Wire shape of the token claims: registered claims plus the user name
/// and rights.
#[derive(Debug, Serialize, Deserialize)]
struct UserClaimsDto {
    user_name: String,
    rights: Vec<String>,
    iss: String,
    aud: Vec<String>,
    sub: String,
    exp: i64,
    iat: i64,
    nbf: i64,
}

pub struct HsJwtProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: Vec<String>,
    issuer: String,
    ttl: Duration,
}

impl HsJwtProvider {
    /// # Errors
    ///
    /// - `InvalidParam` on an empty secret, empty issuer, or zero ttl
    pub fn new(
        secret: &[u8],
        audience: Vec<String>,
        issuer: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, DomainError> {
        let issuer = issuer.into();
        if secret.is_empty() {
            return Err(DomainError::invalid_param("secret not set"));
        }
        if issuer.is_empty() {
            return Err(DomainError::invalid_param("iss not set"));
        }
        if ttl.is_zero() {
            return Err(DomainError::invalid_param("jwt ttl not set"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            audience,
            issuer,
            ttl,
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.clone()]);
        if !self.audience.is_empty() {
            validation.set_audience(&self.audience);
        } else {
            validation.validate_aud = false;
        }
        validation
    }
}

impl JwtProvider for HsJwtProvider {
    fn generate(&self, user: &User) -> Result<String, DomainError> {
        info!("JWT generate started");

        let now = Utc::now();
        let claims = UserClaimsDto {
            user_name: user.username.clone(),
            rights: user.rights.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: user.id.clone(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                let err = DomainError::invalid_jwt(format!("signing of jwt failure: {e}"));
                error!("{err}");
                err
            })?;

        info!("JWT generate completed");
        Ok(token)
    }

    fn introspect(&self, token: &str) -> Result<UserClaims, DomainError> {
        info!("Introspect started");

        let data = decode::<UserClaimsDto>(token, &self.decoding_key, &self.validation())
            .map_err(|e| {
                let err = DomainError::invalid_jwt(format!("jwt parse failure: {e}"));
                error!("{err}");
                err
            })?;

        let claims = data.claims;

        info!("Introspect completed");
        Ok(UserClaims {
            username: claims.user_name,
            issuer: claims.iss,
            audience: claims.aud,
            subject: claims.sub,
            rights: claims.rights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use std::collections::HashMap;

    fn provider(secret: &[u8], ttl: Duration) -> HsJwtProvider {
        HsJwtProvider::new(
            secret,
            vec!["kvs".to_string()],
            "kvs-auth",
            ttl,
        )
        .unwrap()
    }

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
            rights: vec!["admin".to_string()],
            contacts: HashMap::new(),
            linked_id: String::new(),
        }
    }

    #[test]
    fn construction_requires_secret_issuer_and_ttl() {
        assert!(HsJwtProvider::new(b"", vec![], "iss", Duration::hours(1)).is_err());
        assert!(HsJwtProvider::new(b"secret", vec![], "", Duration::hours(1)).is_err());
        assert!(HsJwtProvider::new(b"secret", vec![], "iss", Duration::zero()).is_err());
    }

    #[test]
    fn generated_token_introspects_back_to_the_same_claims() {
        let provider = provider(b"secret", Duration::hours(1));

        let token = provider.generate(&user()).unwrap();
        let claims = provider.introspect(&token).unwrap();

        assert_eq!(claims.username, "admin");
        assert_eq!(claims.subject, "user-1");
        assert_eq!(claims.issuer, "kvs-auth");
        assert_eq!(claims.audience, ["kvs".to_string()]);
        assert_eq!(claims.rights, ["admin".to_string()]);
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let issuer = provider(b"secret-a", Duration::hours(1));
        let verifier = provider(b"secret-b", Duration::hours(1));

        let token = issuer.generate(&user()).unwrap();
        let err = verifier.introspect(&token).unwrap_err();
        assert!(err.is(ErrorKind::InvalidJwt));
    }

    #[test]
    fn expired_token_is_rejected() {
        let provider = provider(b"secret", Duration::seconds(-10));

        let token = provider.generate(&user()).unwrap();
        let err = provider.introspect(&token).unwrap_err();
        assert!(err.is(ErrorKind::InvalidJwt));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let provider = provider(b"secret", Duration::hours(1));
        assert!(provider.introspect("not.a.jwt").is_err());
    }
}
