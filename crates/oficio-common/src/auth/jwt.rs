//! JWT access-token verification using the `jsonwebtoken` crate

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use oficio_core::Snowflake;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// The user ID as a Snowflake
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        self.sub
            .parse::<i64>()
            .map(Snowflake::new)
            .map_err(|_| AppError::InvalidToken)
    }
}

/// Verifies access tokens issued by the identity provider.
///
/// The `issue` side exists for local tooling and tests; production tokens
/// come from outside.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verify a bearer token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(
            |err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            },
        )?;
        Ok(data.claims)
    }

    /// Issue a token for a user (tooling/tests)
    pub fn issue(&self, user_id: Snowflake, ttl_secs: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| AppError::internal(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let verifier = TokenVerifier::new("test-secret");
        let token = verifier.issue(Snowflake::new(42), 60).unwrap();
        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), Snowflake::new(42));
    }

    #[test]
    fn rejects_foreign_secret() {
        let issuer = TokenVerifier::new("secret-a");
        let verifier = TokenVerifier::new("secret-b");
        let token = issuer.issue(Snowflake::new(42), 60).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn rejects_expired() {
        let verifier = TokenVerifier::new("test-secret");
        let token = verifier.issue(Snowflake::new(42), -60).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn rejects_garbage() {
        let verifier = TokenVerifier::new("test-secret");
        assert!(matches!(
            verifier.verify("not-a-token"),
            Err(AppError::InvalidToken)
        ));
    }
}
