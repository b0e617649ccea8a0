//! Credential store port.

/// Password hashing service.
///
/// The credential is an opaque salted one-way hash; callers never see
/// or store a plaintext password beyond the request that carried it.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh random salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored credential.
    ///
    /// A malformed stored credential must yield `Ok(false)`, never an
    /// error: verification against garbage fails, it does not crash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Credential store errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Hashing error: {0}")]
    HashingError(String),
}
