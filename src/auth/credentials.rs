//! Password Credentials
//! Mission: Salted one-way password digests with constant-time verification
//!
//! Digest is HMAC-SHA512 keyed by the hex salt string over the password,
//! hex-encoded. Existing seeded records use this exact format.

use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;
use thiserror::Error;

type HmacSha512 = Hmac<Sha512>;

/// Salt length in raw bytes (hex-encoded to twice this length)
pub const SALT_BYTES: usize = 8;

const UNKNOWN_USER_SALT: &str = "0000000000000000";

/// Stored credential pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub hash: String,
    pub salt: String,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Hash a new password under a fresh random salt.
pub fn create(plaintext: &str) -> Result<Credential, CredentialError> {
    if plaintext.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }

    let mut salt_bytes = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = hex::encode(salt_bytes);

    let hash = hex::encode(digest(plaintext, &salt)?.finalize().into_bytes());

    Ok(Credential { hash, salt })
}

/// Check a password against a stored hash/salt pair.
///
/// A wrong password is `Ok(false)`; only unusable stored data is an error.
pub fn verify(plaintext: &str, stored_hash: &str, stored_salt: &str) -> Result<bool, CredentialError> {
    if stored_salt.is_empty() {
        return Err(CredentialError::MalformedHash);
    }
    let expected = hex::decode(stored_hash).map_err(|_| CredentialError::MalformedHash)?;

    Ok(digest(plaintext, stored_salt)?.verify_slice(&expected).is_ok())
}

/// Burn one digest for a login whose username does not exist, so that
/// path costs the same as a wrong password. Never succeeds.
pub fn verify_unknown(plaintext: &str) -> Result<(), CredentialError> {
    let _ = digest(plaintext, UNKNOWN_USER_SALT)?.verify_slice(&[0u8; 64]);
    Ok(())
}

fn digest(plaintext: &str, salt: &str) -> Result<HmacSha512, CredentialError> {
    let mut mac = HmacSha512::new_from_slice(salt.as_bytes())
        .map_err(|_| CredentialError::MalformedHash)?;
    mac.update(plaintext.as_bytes());
    Ok(mac)
}
