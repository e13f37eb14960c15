//! Password digest boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash(#[source] bcrypt::BcryptError),

    #[error("stored digest is malformed")]
    Verify(#[source] bcrypt::BcryptError),
}

/// One-way hashing/comparison for credential secrets.
///
/// `matches` never reveals *why* a comparison failed; a malformed stored
/// digest is an error, a well-formed mismatch is `Ok(false)`.
pub trait PasswordVerifier: Send + Sync {
    fn digest(&self, plaintext: &str) -> Result<String, PasswordError>;
    fn matches(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError>;
}

/// bcrypt-backed verifier.
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    pub const DEFAULT_COST: u32 = 10;

    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

impl PasswordVerifier for BcryptVerifier {
    fn digest(&self, plaintext: &str) -> Result<String, PasswordError> {
        bcrypt::hash(plaintext, self.cost).map_err(PasswordError::Hash)
    }

    fn matches(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(plaintext, digest).map_err(PasswordError::Verify)
    }
}
