//! Credential hashing port and its argon2 implementation.

use argon2::{
  Argon2,
  password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("credential hashing failed: {0}")]
pub struct HashError(String);

pub trait CredentialHasher: Send + Sync {
  /// Produce a self-describing hash (e.g. a PHC string) for `password`.
  fn hash(&self, password: &str) -> Result<String, HashError>;

  /// Check `password` against a hash produced by [`CredentialHasher::hash`].
  /// A mismatch is `Ok(false)`, not an error.
  fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError>;
}

/// Argon2id with default parameters and a random salt per hash.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
  fn hash(&self, password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|e| HashError(e.to_string()))
  }

  fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(hash).map_err(|e| HashError(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
      Ok(()) => Ok(true),
      Err(password_hash::Error::Password) => Ok(false),
      Err(e) => Err(HashError(e.to_string())),
    }
  }
}
