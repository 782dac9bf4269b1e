//! Port for password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHasherError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Hashes and verifies account passwords.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Produce a self-describing hash string for storage.
    fn hash(&self, password: &str) -> Result<String, CredentialHasherError>;

    /// Check `password` against a stored hash.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialHasherError>;
}

/// Reversible stand-in for tests: the "hash" is the password with a prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

const FIXTURE_PREFIX: &str = "fixture$";

impl CredentialHasher for FixtureCredentialHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHasherError> {
        Ok(format!("{FIXTURE_PREFIX}{password}"))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialHasherError> {
        let plain = stored_hash
            .strip_prefix(FIXTURE_PREFIX)
            .ok_or_else(|| CredentialHasherError::malformed_hash("missing fixture prefix"))?;
        Ok(plain == password)
    }
}
