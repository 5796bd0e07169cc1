//! JWT Token Service
//! Mission: Issue and verify signed, time-bounded bearer tokens
//!
//! Verification is a pure function of the token and the signing secret; no
//! session table is kept. Tokens therefore cannot be revoked: a role change
//! or account deletion only takes effect for tokens issued afterwards, and
//! older tokens stay valid until they expire.

use crate::auth::models::{Claims, Identity, UserRole};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Token verification failures. All of them leave the caller unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("failed to sign token")]
    Signing,
}

/// Token service holding the process signing secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity_secs: i64,
}

impl TokenService {
    /// Create a token service from the configured secret and validity window
    pub fn new(secret: &[u8], validity: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            validity_secs: validity.as_secs() as i64,
        }
    }

    /// Seconds a freshly issued token stays valid
    pub fn validity_secs(&self) -> u64 {
        self.validity_secs as u64
    }

    /// Issue a token for a user, valid from now
    pub fn issue(&self, username: &str, role: UserRole) -> Result<String, TokenError> {
        self.issue_at(username, role, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds)
    pub fn issue_at(&self, username: &str, role: UserRole, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            username: username.to_string(),
            role,
            iat: now,
            exp: now + self.validity_secs,
        };

        debug!(
            "Issuing token for {} ({}), expires in {}s",
            username, role, self.validity_secs
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify a token and extract the caller identity
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token against the clock value `now` (unix seconds).
    ///
    /// The signature is checked before any claim is trusted.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Identity, TokenError> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?;

        if now > decoded.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(decoded.claims.into())
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
