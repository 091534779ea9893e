//! Password hashing and comparison for credentials kept in the config store.

use thiserror::Error;

/// The well-known password every installation starts with.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("stored credential is not a valid hash: {0}")]
    InvalidHash(String),

    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Compares a plaintext candidate against a stored password hash.
///
/// Implementations must not leak, through timing, how much of the candidate
/// matched.
pub trait SecureCompare: Send + Sync {
    fn compare(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordError>;
}

/// bcrypt-backed comparison. The digest comparison inside `bcrypt::verify` is
/// constant time.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptCompare;

impl SecureCompare for BcryptCompare {
    fn compare(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(candidate, stored_hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))
    }
}

/// Hash a password with the default bcrypt cost.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(|e| PasswordError::Hash(e.to_string()))
}
