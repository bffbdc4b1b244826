//! Password hashing and verification.
//!
//! One-way salted hashing with Argon2id. Every call to
//! [`hash_string_with_params`] draws a fresh random salt, so two hashes of
//! the same plaintext never compare
//! equal; digest equality is therefore meaningless and verification always
//! goes through [`verify_string`].

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::PasswordConfig;
use crate::errors::Error;

/// Argon2 hashing cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    /// Create Argon2 instance with these parameters.
    fn to_argon2(self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Secure defaults for production (Argon2id RFC recommendations)
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl From<&PasswordConfig> for Argon2Params {
    fn from(config: &PasswordConfig) -> Self {
        Self {
            memory_kib: config.argon2_memory_kib,
            iterations: config.argon2_iterations,
            parallelism: config.argon2_parallelism,
        }
    }
}

/// Hash a password with the given parameters, or secure defaults if None.
pub fn hash_string_with_params(input: &str, params: Option<Argon2Params>) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = params.unwrap_or_default().to_argon2()?;

    let hash = argon2.hash_password(input.as_bytes(), &salt).map_err(|e| Error::Internal {
        operation: format!("hash password: {e}"),
    })?;

    Ok(hash.to_string())
}

/// Verify a password against a stored digest.
///
/// Verification uses the cost parameters embedded in the digest itself. A
/// malformed or empty digest is a mismatch, not a fault: the caller sees
/// `false`, never an error, so a corrupted record behaves like a wrong
/// password.
pub fn verify_string(input: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default().verify_password(input.as_bytes(), &parsed_hash).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap parameters so the test suite doesn't burn CPU on Argon2.
    fn test_params() -> Argon2Params {
        Argon2Params {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn hash(input: &str) -> String {
        hash_string_with_params(input, Some(test_params())).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let digest = hash("test_password_123");

        assert!(!digest.is_empty());
        assert!(verify_string("test_password_123", &digest));
        assert!(!verify_string("wrong_password", &digest));
    }

    #[test]
    fn test_same_input_different_digests() {
        let digest1 = hash("same_password");
        let digest2 = hash("same_password");

        // Fresh salt per call: identical plaintext never produces identical digests
        assert_ne!(digest1, digest2);

        // But both verify
        assert!(verify_string("same_password", &digest1));
        assert!(verify_string("same_password", &digest2));
    }

    #[test]
    fn test_malformed_digest_is_mismatch_not_fault() {
        assert!(!verify_string("anything", ""));
        assert!(!verify_string("anything", "not-a-digest"));
        assert!(!verify_string("anything", "$argon2id$truncated"));
    }

    #[test]
    fn test_params_from_config() {
        let config = PasswordConfig::default();
        let params = Argon2Params::from(&config);
        assert_eq!(params.memory_kib, config.argon2_memory_kib);
        assert_eq!(params.iterations, config.argon2_iterations);
    }
}
