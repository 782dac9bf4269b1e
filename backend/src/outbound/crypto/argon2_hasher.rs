//! Argon2id password hashing.
//!
//! Hashes are PHC strings, so parameters travel with each hash and can be
//! raised later without invalidating stored credentials.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// [`CredentialHasher`] using Argon2id with the crate's default parameters.
#[derive(Debug, Clone)]
pub struct Argon2CredentialHasher {
    params: Params,
}

impl Default for Argon2CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2CredentialHasher {
    /// Use explicit cost parameters, e.g. cheaper ones in tests.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialHasherError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialHasherError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialHasherError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2CredentialHasher {
        let cheap = Params::new(8, 1, 1, None).expect("valid params");
        Argon2CredentialHasher::with_params(cheap)
    }

    #[rstest]
    fn hashes_verify_and_are_salted(hasher: Argon2CredentialHasher) {
        let first = hasher.hash("DemoPass123!").expect("hash");
        let second = hasher.hash("DemoPass123!").expect("hash");

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(hasher.verify("DemoPass123!", &first).expect("verify"));
        assert!(!hasher.verify("demopass123!", &first).expect("verify"));
    }

    #[rstest]
    fn malformed_hashes_are_reported(hasher: Argon2CredentialHasher) {
        let err = hasher.verify("anything", "plaintext").expect_err("malformed");
        assert!(matches!(err, CredentialHasherError::MalformedHash { .. }));
    }
}
