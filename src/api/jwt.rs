//! Session token issuing and validation
//!
//! Tokens are HS256 JWTs signed with the server's `JWT_SECRET`.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TOKEN_TTL_DAYS;
use crate::db::User;
use crate::{Error, Result};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies session tokens with a shared secret
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer with the default token lifetime
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self::with_ttl_days(secret, DEFAULT_TOKEN_TTL_DAYS)
    }

    #[must_use]
    pub fn with_ttl_days(secret: &SecretString, days: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl: Duration::try_days(days)
                .unwrap_or_else(|| Duration::days(DEFAULT_TOKEN_TTL_DAYS)),
        }
    }

    /// Issue a token for a user
    ///
    /// # Errors
    ///
    /// Returns `Auth` error if signing fails, or `Config` if the lifetime
    /// overflows the clock
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::Config("token lifetime out of range".to_string()))?;
        let claims = SessionClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Auth(format!("failed to sign token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `Auth` error if the token is malformed, forged or expired
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                Error::Auth("Invalid token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new(&secret("test-secret"));
        let token = issuer.issue(&user()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_rejects_foreign_secret() {
        let token = TokenIssuer::new(&secret("one")).issue(&user()).unwrap();
        let err = TokenIssuer::new(&secret("two")).verify(&token).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_rejects_expired() {
        let issuer = TokenIssuer::with_ttl_days(&secret("s"), -1);
        let token = issuer.issue(&user()).unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_huge_lifetime_does_not_panic() {
        let issuer = TokenIssuer::with_ttl_days(&secret("s"), i64::MAX);
        let token = issuer.issue(&user()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn test_rejects_garbage() {
        let issuer = TokenIssuer::new(&secret("s"));
        assert!(issuer.verify("not.a.jwt").is_err());
        assert!(issuer.verify("").is_err());
    }
}
